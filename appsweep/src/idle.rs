use std::time::{Duration, Instant};

/// Declares the run complete once no deletion has happened for the
/// configured idle window.
///
/// The console gives no explicit "list exhausted" signal, so completion is
/// inferred from deletion-rate idleness alone.
#[derive(Debug)]
pub struct IdleDetector {
    threshold: Duration,
    last_progress: Instant,
}

impl IdleDetector {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            last_progress: Instant::now(),
        }
    }

    /// Reset the idle window; called after every successful deletion.
    pub fn note_progress(&mut self) {
        self.last_progress = Instant::now();
    }

    pub fn is_idle(&self) -> bool {
        self.idle_for() > self.threshold
    }

    /// Time elapsed since the last deletion (or since construction).
    pub fn idle_for(&self) -> Duration {
        self.last_progress.elapsed()
    }
}
