//! Real [`BrowserSession`] over a WebDriver endpoint.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tracing::{debug, instrument};

use crate::errors::{FailureClass, SweepError};
use crate::selector::Selector;
use crate::session::{BrowserSession, ElementHandle, WaitCondition};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Maps opaque [`ElementHandle`]s back to live backend elements.
///
/// The registry is dropped wholesale whenever the page is replaced
/// (navigation, refresh): every handle minted before that points at a
/// document that no longer exists, and resolving one surfaces as a
/// stale-element failure rather than silently pinning dead elements.
struct HandleRegistry<T> {
    entries: Mutex<HashMap<String, T>>,
    next_id: AtomicU64,
}

impl<T: Clone> HandleRegistry<T> {
    fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    fn register(&self, value: T) -> ElementHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = ElementHandle::new(format!("wd-{id}"));
        self.entries
            .lock()
            .expect("element registry poisoned")
            .insert(handle.id().to_string(), value);
        handle
    }

    fn resolve(&self, handle: &ElementHandle) -> Result<T, SweepError> {
        self.entries
            .lock()
            .expect("element registry poisoned")
            .get(handle.id())
            .cloned()
            .ok_or_else(|| SweepError::StaleElement(format!("unknown handle {}", handle.id())))
    }

    /// Invalidate every outstanding handle.
    fn clear(&self) {
        self.entries
            .lock()
            .expect("element registry poisoned")
            .clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().expect("element registry poisoned").len()
    }
}

/// Browser session backed by a fantoccini WebDriver client.
///
/// Resolved elements are kept in a registry keyed by handle id so the rest
/// of the engine can stay backend-agnostic; a handle whose element the page
/// has re-rendered surfaces as a stale-element failure on use.
pub struct WebDriverSession {
    client: Client,
    elements: HandleRegistry<Element>,
}

impl WebDriverSession {
    /// Connect to a running WebDriver endpoint (geckodriver, chromedriver).
    #[instrument(skip(headless))]
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self, SweepError> {
        let mut caps = serde_json::Map::new();
        if headless {
            let mut firefox_opts = serde_json::Map::new();
            firefox_opts.insert("args".to_string(), json!(["-headless"]));
            caps.insert("moz:firefoxOptions".to_string(), json!(firefox_opts));
            let mut chrome_opts = serde_json::Map::new();
            chrome_opts.insert(
                "args".to_string(),
                json!(["--headless", "--disable-gpu", "--window-size=1920,1080"]),
            );
            caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
        }

        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .map_err(|e| {
                SweepError::Session(format!("failed to connect to {webdriver_url}: {e}"))
            })?;

        Ok(Self {
            client,
            elements: HandleRegistry::new(),
        })
    }

    fn register(&self, element: Element) -> ElementHandle {
        self.elements.register(element)
    }

    fn resolve(&self, handle: &ElementHandle) -> Result<Element, SweepError> {
        self.elements.resolve(handle)
    }

    /// Find all current matches, tolerating the no-such-element answer.
    async fn matches(&self, selector: &Selector) -> Result<Vec<Element>, SweepError> {
        let owned = locator_source(selector);
        match self.client.find_all(as_locator(selector, &owned)).await {
            Ok(elements) => Ok(elements),
            Err(CmdError::NoSuchElement(_)) => Ok(Vec::new()),
            Err(err) => Err(map_cmd_error(err)),
        }
    }

    async fn satisfies(
        &self,
        element: &Element,
        condition: WaitCondition,
    ) -> Result<bool, SweepError> {
        let ok = match condition {
            WaitCondition::Present => true,
            WaitCondition::Visible => element.is_displayed().await.map_err(map_cmd_error)?,
            WaitCondition::Clickable => {
                element.is_displayed().await.map_err(map_cmd_error)?
                    && element.is_enabled().await.map_err(map_cmd_error)?
            }
        };
        Ok(ok)
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<(), SweepError> {
        debug!(url, "navigating");
        self.elements.clear();
        self.client.goto(url).await.map_err(map_cmd_error)
    }

    async fn current_url(&self) -> Result<String, SweepError> {
        Ok(self
            .client
            .current_url()
            .await
            .map_err(map_cmd_error)?
            .to_string())
    }

    async fn find_element(&self, selector: &Selector) -> Result<Option<ElementHandle>, SweepError> {
        for element in self.matches(selector).await? {
            if self.satisfies(&element, WaitCondition::Visible).await? {
                return Ok(Some(self.register(element)));
            }
        }
        Ok(None)
    }

    async fn wait_until(
        &self,
        condition: WaitCondition,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<ElementHandle, SweepError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.matches(selector).await {
                Ok(elements) => {
                    for element in elements {
                        match self.satisfies(&element, condition).await {
                            Ok(true) => return Ok(self.register(element)),
                            Ok(false) => {}
                            // Went stale between find and inspect; poll again.
                            Err(err) if FailureClass::of(&err) == FailureClass::Structural => {}
                            Err(err) => return Err(err),
                        }
                    }
                }
                // The page may be mid-render; keep polling until the deadline.
                Err(err) if FailureClass::of(&err) == FailureClass::Structural => {}
                Err(err) => return Err(err),
            }
            if Instant::now() >= deadline {
                return Err(SweepError::Timeout(format!(
                    "waited {timeout:?} for {condition:?} on {selector}"
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_gone(&self, selector: &Selector, timeout: Duration) -> Result<(), SweepError> {
        let deadline = Instant::now() + timeout;
        loop {
            let mut visible = false;
            for element in self.matches(selector).await? {
                // A stale answer means the element just left the page.
                if matches!(element.is_displayed().await, Ok(true)) {
                    visible = true;
                    break;
                }
            }
            if !visible {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(SweepError::Timeout(format!(
                    "waited {timeout:?} for {selector} to go away"
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), SweepError> {
        self.resolve(element)?.click().await.map_err(map_cmd_error)
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> Result<(), SweepError> {
        self.resolve(element)?
            .send_keys(text)
            .await
            .map_err(map_cmd_error)
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, SweepError> {
        self.resolve(element)?.text().await.map_err(map_cmd_error)
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> Result<(), SweepError> {
        let element = self.resolve(element)?;
        let arg = serde_json::to_value(&element)
            .map_err(|e| SweepError::Internal(format!("element serialization: {e}")))?;
        self.client
            .execute("arguments[0].scrollIntoView();", vec![arg])
            .await
            .map_err(map_cmd_error)?;
        Ok(())
    }

    async fn page_up(&self) -> Result<(), SweepError> {
        self.client
            .execute("window.scrollBy(0, -window.innerHeight);", vec![])
            .await
            .map_err(map_cmd_error)?;
        Ok(())
    }

    async fn refresh(&self) -> Result<(), SweepError> {
        self.elements.clear();
        self.client.refresh().await.map_err(map_cmd_error)
    }

    async fn close(&self) -> Result<(), SweepError> {
        self.client.clone().close().await.map_err(map_cmd_error)
    }
}

/// Keep the locator's backing string alive across the `Locator<'_>` borrow.
fn locator_source(selector: &Selector) -> String {
    match selector {
        Selector::XPath(s) | Selector::Css(s) | Selector::Id(s) => s.clone(),
        Selector::ClassName(s) => format!(".{s}"),
    }
}

fn as_locator<'a>(selector: &Selector, source: &'a str) -> Locator<'a> {
    match selector {
        Selector::XPath(_) => Locator::XPath(source),
        Selector::Css(_) | Selector::ClassName(_) => Locator::Css(source),
        Selector::Id(_) => Locator::Id(source),
    }
}

fn map_cmd_error(err: CmdError) -> SweepError {
    match err {
        CmdError::NoSuchElement(e) => SweepError::ElementNotFound(e.to_string()),
        CmdError::NoSuchWindow(e) => SweepError::WindowClosed(e.to_string()),
        CmdError::WaitTimeout => SweepError::Timeout("webdriver wait timed out".into()),
        CmdError::Lost(e) => SweepError::ConnectionFailed(e.to_string()),
        CmdError::Standard(e) => {
            let message = e.to_string();
            let lowered = message.to_lowercase();
            if lowered.contains("stale element") {
                SweepError::StaleElement(message)
            } else if lowered.contains("no such window")
                || lowered.contains("window already closed")
            {
                SweepError::WindowClosed(message)
            } else if lowered.contains("no such element") {
                SweepError::ElementNotFound(message)
            } else if lowered.contains("timed out") || lowered.contains("timeout") {
                SweepError::NetworkTimeout(message)
            } else if lowered.contains("err_internet_disconnected")
                || lowered.contains("connection refused")
                || lowered.contains("connection reset")
            {
                SweepError::ConnectionFailed(message)
            } else {
                SweepError::Session(message)
            }
        }
        other => SweepError::Session(other.to_string()),
    }
}
