//! Progress reporting for the record loader.
//!
//! [`ProgressCallback`] keeps the loader independent of any rendering
//! backend. The `indicatif` implementation lives in the CLI utilities crate.

use std::sync::Arc;

/// Receives progress updates while rows are streamed.
pub trait ProgressCallback: Send + Sync {
    /// Advance progress by `delta` valid rows.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
