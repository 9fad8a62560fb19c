//! The per-language review state machine and the batch operations that
//! drive it.

pub mod service;
pub mod stage;

pub use service::{artifact_path, ReviewOutcome, TranslateOutcome, WorkflowService};
pub use stage::{apply_transition, check_transition, Stage, Transition};
