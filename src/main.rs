//! Snapshot harness for the hint engine
//!
//! Runs the allocator and controller against a serialized page snapshot
//! so allocation behavior can be inspected without a host browser.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use pagehint::cli::{CliArgs, CliCommand};
use pagehint::config::Preferences;
use pagehint::hints::candidates::label_text;
use pagehint::hints::HintController;
use pagehint::keys::{Key, KeyInput, Modifiers};
use pagehint::page::{RecordingClicker, SnapshotPage};

fn main() -> Result<()> {
    pagehint::tracing::init();

    let args = CliArgs::parse();
    let page = load_page(args.command.page())?;
    let prefs = match args.command.prefs() {
        Some(path) => Preferences::load_from_path(path),
        None => Preferences::load(),
    };

    let mut controller = HintController::new(prefs);
    let mut clicker = RecordingClicker::new();
    activate(&mut controller, &page, &mut clicker, args.command.new_tab());

    match args.command {
        CliCommand::Show { .. } => {
            print_table(&controller, &page);
        }
        CliCommand::Type { keys, .. } => {
            type_keys(&mut controller, &page, &mut clicker, &keys);
            print_clicks(&clicker, &page);
        }
    }

    Ok(())
}

fn load_page(path: &Path) -> Result<SnapshotPage> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read page snapshot {}", path.display()))?;
    SnapshotPage::from_json(&json)
        .with_context(|| format!("Failed to parse page snapshot {}", path.display()))
}

/// Tap the trigger so the controller runs a real activation
fn activate(
    controller: &mut HintController,
    page: &SnapshotPage,
    clicker: &mut RecordingClicker,
    new_tab: bool,
) {
    let trigger = if new_tab {
        controller.preferences().trigger_newtab
    } else {
        controller.preferences().trigger
    };
    let t = Instant::now();
    controller.handle_key_down(page, clicker, KeyInput::plain(trigger, t));
    controller.handle_key_up(page, KeyInput::plain(trigger, t + Duration::from_millis(50)));
}

fn print_table(controller: &HintController, page: &SnapshotPage) {
    let table = controller.assignments();
    if table.is_empty() {
        println!("No shortcuts allocated.");
        return;
    }
    for sequence in table.sequences_sorted() {
        let target = table
            .lookup(sequence)
            .expect("sorted sequence came from the table");
        let label = label_text(page, target).unwrap_or_default();
        println!("{:>4}  #{:<4} {}", sequence, target.0, label);
    }
}

fn type_keys(
    controller: &mut HintController,
    page: &SnapshotPage,
    clicker: &mut RecordingClicker,
    keys: &str,
) {
    let mut t = Instant::now();
    for c in keys.chars() {
        // Uppercase input replays as shift + lowercase key.
        let shift = c.is_uppercase();
        let key = Key::Char(c.to_lowercase().next().unwrap_or(c));
        let modifiers = Modifiers::new(false, shift, false, false);
        t += Duration::from_millis(80);
        controller.handle_key_down(page, clicker, KeyInput::new(key, modifiers, t));
        t += Duration::from_millis(40);
        controller.handle_key_up(page, KeyInput::new(key, modifiers, t));
    }
}

fn print_clicks(clicker: &RecordingClicker, page: &SnapshotPage) {
    if clicker.clicks.is_empty() {
        println!("No clicks dispatched.");
        return;
    }
    for (target, new_tab) in &clicker.clicks {
        let label = label_text(page, *target).unwrap_or_default();
        let mode = if *new_tab { " (new tab)" } else { "" };
        println!("click #{}{} {}", target.0, mode, label);
    }
}
