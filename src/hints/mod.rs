//! The hint engine: allocation and the input state machine
//!
//! Pipeline at activation time:
//!
//! ```text
//! override rules → declared shortcuts → visible candidates → sequences
//! ```
//!
//! [`controller::HintController`] drives the pipeline once per trigger
//! tap and owns everything the activation creates.

pub mod allocator;
pub mod candidates;
pub mod controller;
pub mod markers;
pub mod overrides;
pub mod visibility;

pub use allocator::{build_assignments, Alphabet, Assignment, AssignmentTable};
pub use controller::{HintController, KeyDisposition, Phase, MAX_TRIGGER_DURATION};
pub use markers::{Marker, MarkerSet, MarkerStyle, MarkerView};
pub use overrides::{CompiledRule, MatchKind, OverrideRule};
