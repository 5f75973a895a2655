use async_trait::async_trait;
use std::time::Duration;

use crate::errors::SweepError;
use crate::selector::Selector;

/// Opaque reference to an element previously resolved by a [`BrowserSession`].
///
/// The handle stays valid only as long as the backing element does; acting on
/// a handle whose element has been re-rendered yields
/// [`SweepError::StaleElement`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    id: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Condition a bounded wait polls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// Element is attached to the page.
    Present,
    /// Element is displayed.
    Visible,
    /// Element is displayed and enabled.
    Clickable,
}

/// Capability surface of the driven browser.
///
/// One session maps to one browser for the duration of a run; the engine is
/// strictly sequential, so implementations never see concurrent calls. All
/// waits are bounded polls; expiry surfaces as [`SweepError::Timeout`].
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), SweepError>;

    async fn current_url(&self) -> Result<String, SweepError>;

    /// Find the first *displayed* element matching the selector.
    ///
    /// Absence is a normal answer, not an error: `Ok(None)` means the page
    /// currently renders no such element.
    async fn find_element(&self, selector: &Selector) -> Result<Option<ElementHandle>, SweepError>;

    /// Poll until an element matching the selector satisfies `condition`,
    /// up to `timeout`.
    async fn wait_until(
        &self,
        condition: WaitCondition,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<ElementHandle, SweepError>;

    /// Poll until no displayed element matches the selector, up to `timeout`.
    async fn wait_gone(&self, selector: &Selector, timeout: Duration) -> Result<(), SweepError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), SweepError>;

    async fn type_text(&self, element: &ElementHandle, text: &str) -> Result<(), SweepError>;

    async fn text(&self, element: &ElementHandle) -> Result<String, SweepError>;

    async fn scroll_into_view(&self, element: &ElementHandle) -> Result<(), SweepError>;

    /// Page-up style scroll gesture on the whole window.
    async fn page_up(&self) -> Result<(), SweepError>;

    async fn refresh(&self) -> Result<(), SweepError>;

    /// Terminate the session. Called exactly once per run, on every exit path.
    async fn close(&self) -> Result<(), SweepError>;
}
