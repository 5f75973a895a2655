use std::time::SystemTime;

use tracing::{debug, error, info, instrument, warn};

use crate::config::SweepConfig;
use crate::errors::{FailureClass, SweepError};
use crate::events::{DeletionRecord, EventSink};
use crate::idle::IdleDetector;
use crate::page::LocatorSet;
use crate::retry::RetryState;
use crate::session::{BrowserSession, WaitCondition};

/// Result of probing one row slot during a sweep.
///
/// `Empty` and `StaleSkip` are normal branches, not recovered failures: a
/// slot with nothing in it this sweep is simply skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    /// An app was deleted; carries the display name from the banner.
    Deleted(String),
    /// No visible action control in this slot.
    Empty,
    /// The slot vanished or went stale mid-sequence; retried next sweep.
    StaleSkip,
}

/// Scans the candidate slots repeatedly and deletes whatever they render,
/// until the idle window declares the list exhausted.
pub struct DeletionLoop<'a> {
    locators: &'a LocatorSet,
    config: &'a SweepConfig,
    events: &'a dyn EventSink,
}

impl<'a> DeletionLoop<'a> {
    pub fn new(
        locators: &'a LocatorSet,
        config: &'a SweepConfig,
        events: &'a dyn EventSink,
    ) -> Self {
        Self {
            locators,
            config,
            events,
        }
    }

    /// Run sweeps until idle or a fatal failure. Returns the total number of
    /// deleted apps.
    #[instrument(skip_all)]
    pub async fn run(&self, session: &dyn BrowserSession) -> Result<u64, SweepError> {
        let mut deleted: u64 = 0;
        let mut idle = IdleDetector::new(self.config.idle_threshold);
        let mut retry = RetryState::new(self.config.max_retries);

        loop {
            match self.sweep(session, &mut deleted, &mut idle).await {
                Ok(true) => retry.reset(),
                Ok(false) => {
                    if idle.is_idle() {
                        info!(
                            deleted,
                            idle_for = ?idle.idle_for(),
                            "no apps left to delete, stopping"
                        );
                        self.events.idle_stop(deleted);
                        break;
                    }
                }
                Err(err) => match FailureClass::of(&err) {
                    FailureClass::Transient => {
                        if !retry.record_transient() {
                            error!(
                                error = %err,
                                attempts = retry.attempts(),
                                "transient retries exhausted, aborting"
                            );
                            return Err(err);
                        }
                        warn!(
                            error = %err,
                            attempt = retry.attempts(),
                            max = self.config.max_retries,
                            "transient sweep failure, refreshing and retrying"
                        );
                        self.events
                            .sweep_retry(retry.attempts(), self.config.max_retries, &err);
                        if let Err(err) = session.refresh().await {
                            warn!(error = %err, "refresh failed, retrying sweep regardless");
                        }
                        tokio::time::sleep(self.config.retry_backoff).await;
                    }
                    // probe_slot absorbs these; anything arriving here came
                    // from the inter-slot bookkeeping and resolves next sweep.
                    FailureClass::Structural => {
                        warn!(error = %err, "structural failure escaped a sweep, continuing")
                    }
                    FailureClass::Fatal => {
                        error!(error = %err, "fatal failure during sweep, aborting");
                        return Err(err);
                    }
                },
            }
        }
        Ok(deleted)
    }

    /// One pass over every candidate slot, in order. Returns whether the
    /// sweep deleted anything.
    async fn sweep(
        &self,
        session: &dyn BrowserSession,
        deleted: &mut u64,
        idle: &mut IdleDetector,
    ) -> Result<bool, SweepError> {
        let mut progress = false;
        for slot in 0..self.config.slot_count {
            match self.probe_slot(session, slot).await? {
                SlotOutcome::Deleted(name) => {
                    *deleted += 1;
                    progress = true;
                    idle.note_progress();
                    info!(slot, name = %name, total = *deleted, "deleted app");
                    self.events.deletion(&DeletionRecord {
                        name,
                        at: SystemTime::now(),
                        total: *deleted,
                    });
                    // The list re-renders after a deletion; scroll back up and
                    // let it settle before probing the next slot.
                    session.page_up().await?;
                    tokio::time::sleep(self.config.rescroll_settle).await;
                }
                SlotOutcome::Empty => {}
                SlotOutcome::StaleSkip => {
                    debug!(slot, "slot went stale mid-sequence, skipping")
                }
            }
        }
        Ok(progress)
    }

    /// Probe one slot, folding structural failures into [`SlotOutcome`].
    /// Transient and fatal errors escape to the sweep level.
    async fn probe_slot(
        &self,
        session: &dyn BrowserSession,
        slot: usize,
    ) -> Result<SlotOutcome, SweepError> {
        match self.delete_slot(session, slot).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => match FailureClass::of(&err) {
                FailureClass::Structural => {
                    debug!(slot, error = %err, "structural failure in slot");
                    Ok(SlotOutcome::StaleSkip)
                }
                _ => Err(err),
            },
        }
    }

    /// The delete-confirm sequence for one slot: reveal the row popover,
    /// click the delete affordance, confirm, and read the app's display name
    /// off the resulting banner.
    async fn delete_slot(
        &self,
        session: &dyn BrowserSession,
        slot: usize,
    ) -> Result<SlotOutcome, SweepError> {
        let selector = self.locators.slot_action(slot);
        let Some(action) = session.find_element(&selector).await? else {
            return Ok(SlotOutcome::Empty);
        };

        session.scroll_into_view(&action).await?;
        session
            .wait_gone(&self.locators.modal_overlay, self.config.action_wait)
            .await?;
        session.click(&action).await?;

        let delete = session
            .wait_until(
                WaitCondition::Clickable,
                &self.locators.delete_action,
                self.config.action_wait,
            )
            .await?;
        session
            .wait_gone(&self.locators.modal_overlay, self.config.action_wait)
            .await?;
        session.click(&delete).await?;
        tokio::time::sleep(self.config.confirm_settle).await;

        let confirm = session
            .wait_until(
                WaitCondition::Clickable,
                &self.locators.delete_confirm,
                self.config.action_wait,
            )
            .await?;
        session.click(&confirm).await?;
        session
            .wait_gone(&self.locators.modal_overlay, self.config.action_wait)
            .await?;

        let banner = session
            .wait_until(
                WaitCondition::Visible,
                &self.locators.deletion_banner,
                self.config.action_wait,
            )
            .await?;
        let name = session.text(&banner).await?;
        Ok(SlotOutcome::Deleted(name))
    }
}
