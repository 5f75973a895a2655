use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for one deletion run.
///
/// Defaults mirror the console's observed behavior: short waits for optional
/// and error-banner checks, long waits for primary actions, and an idle
/// window comfortably longer than one sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Number of candidate row slots scanned per sweep. A static upper bound
    /// on simultaneously visible rows, not a count of actual apps.
    pub slot_count: usize,
    /// Short wait for optional elements and error banners.
    pub banner_wait: Duration,
    /// Wait budget for login navigation actions.
    pub nav_wait: Duration,
    /// Wait budget for the delete-confirm sequence.
    pub action_wait: Duration,
    /// Settle delay after navigating to the apps list.
    pub page_settle: Duration,
    /// Settle delay between the delete affordance and the confirm control.
    pub confirm_settle: Duration,
    /// Settle delay after the post-deletion scroll-up gesture.
    pub rescroll_settle: Duration,
    /// Zero-deletion window after which the run is declared complete.
    ///
    /// Completion is inferred purely from deletion-rate idleness; there is no
    /// explicit "list is empty" signal. Keep this longer than one full sweep
    /// plus rendering delays or the loop will terminate early with rows left.
    pub idle_threshold: Duration,
    /// Maximum *consecutive* transient sweep failures before aborting.
    pub max_retries: u32,
    /// Delay between a page refresh and the retried sweep.
    pub retry_backoff: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            slot_count: 10,
            banner_wait: Duration::from_secs(1),
            nav_wait: Duration::from_secs(10),
            action_wait: Duration::from_secs(20),
            page_settle: Duration::from_secs(5),
            confirm_settle: Duration::from_secs(1),
            rescroll_settle: Duration::from_secs(3),
            idle_threshold: Duration::from_secs(20),
            max_retries: 3,
            retry_backoff: Duration::from_secs(4),
        }
    }
}
