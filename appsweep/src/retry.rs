/// Bounded retry budget for transient sweep failures.
///
/// Only *consecutive* transient failures count: any sweep that deletes at
/// least one app resets the counter. Once `max_retries` consecutive failures
/// have accumulated the run aborts and the last error propagates.
#[derive(Debug)]
pub struct RetryState {
    max_retries: u32,
    consecutive: u32,
}

impl RetryState {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            consecutive: 0,
        }
    }

    /// Record one transient failure. Returns `true` while budget remains for
    /// another retry, `false` once the bound is hit.
    pub fn record_transient(&mut self) -> bool {
        self.consecutive += 1;
        self.consecutive < self.max_retries
    }

    /// Called after a sweep that made progress.
    pub fn reset(&mut self) {
        self.consecutive = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.consecutive
    }
}
