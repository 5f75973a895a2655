use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::auth::Authenticator;
use crate::config::SweepConfig;
use crate::errors::SweepError;
use crate::events::EventSink;
use crate::page::LocatorSet;
use crate::session::BrowserSession;
use crate::sweep::DeletionLoop;
use crate::{Credentials, RunReport};

/// Orchestrates one run: authenticate, sweep, tear down.
///
/// The browser session is owned by the driver for the duration of the run
/// and is closed exactly once on every exit path, including authentication
/// failure and fatal aborts.
pub struct SessionDriver {
    config: SweepConfig,
    locators: LocatorSet,
}

impl SessionDriver {
    pub fn new(config: SweepConfig, locators: LocatorSet) -> Self {
        Self { config, locators }
    }

    pub fn with_defaults() -> Self {
        Self::new(SweepConfig::default(), LocatorSet::default())
    }

    #[instrument(skip_all)]
    pub async fn run(
        &self,
        session: &dyn BrowserSession,
        credentials: &Credentials,
        events: &dyn EventSink,
    ) -> Result<RunReport, SweepError> {
        let started = Instant::now();
        let result = self.drive(session, credentials, events).await;

        // Teardown happens before the verdict: the session must not outlive
        // the run even when it failed.
        if let Err(err) = session.close().await {
            warn!(error = %err, "failed to close browser session");
        }

        let deleted = result?;
        let report = RunReport {
            deleted,
            elapsed: started.elapsed(),
        };
        info!(deleted = report.deleted, elapsed = ?report.elapsed, "run finished");
        Ok(report)
    }

    async fn drive(
        &self,
        session: &dyn BrowserSession,
        credentials: &Credentials,
        events: &dyn EventSink,
    ) -> Result<u64, SweepError> {
        Authenticator::new(&self.locators, &self.config)
            .authenticate(session, credentials)
            .await?;
        DeletionLoop::new(&self.locators, &self.config, events)
            .run(session)
            .await
    }
}
