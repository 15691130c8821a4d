//! Command-line argument parsing for the snapshot harness
//!
//! Supports:
//! - Showing the allocated shortcut table for a page snapshot
//! - Replaying a key sequence against a snapshot and reporting clicks

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Keyboard shortcut overlay engine
#[derive(Parser, Debug)]
#[command(name = "pagehint", version, about = "Keyboard shortcut overlay engine")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Allocate shortcuts for a page snapshot and print the table
    Show {
        /// Page snapshot (JSON)
        #[arg(long, value_name = "FILE")]
        page: PathBuf,

        /// Preferences file (YAML); defaults to the user config
        #[arg(long, value_name = "FILE")]
        prefs: Option<PathBuf>,

        /// Activate in "open in new tab" mode
        #[arg(long)]
        new_tab: bool,
    },

    /// Replay a key sequence against a snapshot and report dispatches
    Type {
        /// Page snapshot (JSON)
        #[arg(long, value_name = "FILE")]
        page: PathBuf,

        /// Preferences file (YAML); defaults to the user config
        #[arg(long, value_name = "FILE")]
        prefs: Option<PathBuf>,

        /// Characters to type after activation
        #[arg(long, value_name = "CHARS")]
        keys: String,

        /// Activate in "open in new tab" mode
        #[arg(long)]
        new_tab: bool,
    },
}

impl CliCommand {
    pub fn page(&self) -> &PathBuf {
        match self {
            CliCommand::Show { page, .. } | CliCommand::Type { page, .. } => page,
        }
    }

    pub fn prefs(&self) -> Option<&PathBuf> {
        match self {
            CliCommand::Show { prefs, .. } | CliCommand::Type { prefs, .. } => prefs.as_ref(),
        }
    }

    pub fn new_tab(&self) -> bool {
        match self {
            CliCommand::Show { new_tab, .. } | CliCommand::Type { new_tab, .. } => *new_tab,
        }
    }
}
