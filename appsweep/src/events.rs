use std::time::SystemTime;

use crate::errors::SweepError;

/// One successful deletion, as reported to the event sink.
#[derive(Debug, Clone)]
pub struct DeletionRecord {
    /// Display name read from the confirmation banner.
    pub name: String,
    /// When the deletion was observed.
    pub at: SystemTime,
    /// Running total including this deletion.
    pub total: u64,
}

/// Injected observability collaborator for run progress.
///
/// The engine reports progress here and diagnostics through `tracing`; it
/// never touches the filesystem or stdout itself, so tests can run against
/// an in-memory sink.
pub trait EventSink: Send + Sync {
    fn deletion(&self, record: &DeletionRecord);

    fn sweep_retry(&self, attempt: u32, max: u32, error: &SweepError);

    fn idle_stop(&self, total: u64);
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn deletion(&self, _record: &DeletionRecord) {}

    fn sweep_retry(&self, _attempt: u32, _max: u32, _error: &SweepError) {}

    fn idle_stop(&self, _total: u64) {}
}
