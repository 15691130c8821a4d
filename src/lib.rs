//! pagehint - keyboard shortcut overlay engine
//!
//! This crate provides the core types and logic for a keyboard-driven
//! page overlay: given a snapshot of a document, it allocates a unique
//! key sequence to every visible clickable element and drives a small
//! keystroke state machine that dispatches clicks as the user types.

pub mod adapter;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod hints;
pub mod keys;
pub mod page;
pub mod tracing;

// Re-export commonly used types
pub use adapter::{ClickSimulator, ElementId, PageAdapter, Point, Rect, ViewportInfo};
pub use config::Preferences;
pub use hints::{build_assignments, AssignmentTable, HintController, KeyDisposition, Phase};
pub use keys::{Key, KeyInput, Modifiers};
pub use page::SnapshotPage;
