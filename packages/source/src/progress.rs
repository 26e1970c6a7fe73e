//! Progress reporting for long-running pipeline steps.
//!
//! Downloads and per-station scans report through [`ProgressCallback`] so
//! the library crates stay independent of any terminal rendering. The CLI
//! supplies an `indicatif` implementation.

use std::sync::Arc;

/// Receives progress updates from a pipeline step.
///
/// Implementations must be `Send + Sync`: updates arrive from concurrent
/// download tasks and rayon workers.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total number of work units.
    fn set_total(&self, total: u64);

    /// Sets the absolute position.
    fn set_position(&self, pos: u64);

    /// Advances by `delta` units.
    fn inc(&self, delta: u64);

    /// Replaces the status message.
    fn set_message(&self, msg: String);

    /// Marks the step complete with a final message.
    fn finish(&self, msg: String);

    /// Marks the step complete and removes the indicator.
    fn finish_and_clear(&self);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn set_position(&self, _pos: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
