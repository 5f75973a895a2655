//! Bulk removal of installed cloud apps from an appstore web console
//!
//! This crate drives an authenticated browser session through the console's
//! application list and deletes entries until the list stays quiet: sign in,
//! sweep a bounded set of row slots for delete controls, confirm each
//! deletion, and stop once no deletion has happened for a configured idle
//! window. Transient network failures are retried a bounded number of times
//! with a page refresh in between; UI lookup failures are treated as empty
//! slots and skipped.
//!
//! The browser itself sits behind the [`BrowserSession`] trait so the engine
//! can run against a real WebDriver endpoint ([`WebDriverSession`]) or a
//! scripted stand-in in tests.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

pub mod auth;
pub mod config;
pub mod driver;
pub mod errors;
pub mod events;
pub mod idle;
pub mod page;
pub mod retry;
pub mod selector;
pub mod session;
pub mod sweep;
pub mod webdriver;

pub use auth::Authenticator;
pub use config::SweepConfig;
pub use driver::SessionDriver;
pub use errors::{FailureClass, SweepError};
pub use events::{DeletionRecord, EventSink, NullSink};
pub use idle::IdleDetector;
pub use page::LocatorSet;
pub use retry::RetryState;
pub use selector::Selector;
pub use session::{BrowserSession, ElementHandle, WaitCondition};
pub use sweep::{DeletionLoop, SlotOutcome};
pub use webdriver::WebDriverSession;

/// Username/password pair for the console account. Immutable for the run,
/// supplied by the caller, never persisted.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// The password must not leak into logs or error traces.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Final outcome of one deletion run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Total number of apps deleted across all sweeps.
    pub deleted: u64,
    /// Wall-clock duration of the run, including authentication.
    pub elapsed: Duration,
}
