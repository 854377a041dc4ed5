//! Iterative search for an encoding that fits the byte budget.
//!
//! The search is split in two:
//! - [`SearchController`]: a pure state machine over quality and canvas size
//! - [`run_search`] / [`run_search_async`]: loops that feed it real encodes
//!
//! Keeping the controller free of I/O lets tests drive it with a size model
//! instead of a real encoder.

mod controller;
mod driver;

pub use controller::{
    Adjustment, EncodeRequest, SearchController, SearchOutcome, SearchState, Termination,
    Transition,
};
pub use driver::{run_search, run_search_async, AttemptRecord};

/// Hard cap on encode attempts per search.
pub const MAX_ATTEMPTS: u32 = 15;

/// Resolution escalation is only considered from this attempt on.
pub const ESCALATION_MIN_ATTEMPTS: u32 = 8;

/// Overshoot (relative to the budget) that triggers escalation.
pub const ESCALATION_RATIO: f64 = 1.5;

/// Escalation aims for this share of the budget when sizing the new canvas.
pub const ESCALATION_HEADROOM: f64 = 0.9;

/// Initial quality bounds.
pub const QUALITY_LOWER: f32 = 0.30;
pub const QUALITY_UPPER: f32 = 0.95;

/// Quality and bounds after a resolution escalation.
pub const ESCALATION_QUALITY: f32 = 0.65;
pub const ESCALATION_LOWER: f32 = 0.30;
pub const ESCALATION_UPPER: f32 = 0.85;
