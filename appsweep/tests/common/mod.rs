//! Scripted in-memory [`BrowserSession`] for driving the engine in tests.

// Each test binary compiles this module separately and uses a subset of it.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use appsweep::{
    BrowserSession, DeletionRecord, ElementHandle, EventSink, LocatorSet, Selector, SweepConfig,
    SweepError, WaitCondition,
};

/// One scripted entry in the rendered app list. A `Fault` is consumed by the
/// next probe of slot 0 and surfaces as the given error, hiding the rows
/// behind it until consumed.
pub enum Row {
    App(String),
    Fault(SweepError),
}

#[derive(Default)]
struct State {
    rows: VecDeque<Row>,
    bot_challenge: bool,
    menu_unavailable: bool,
    email_rejected: bool,
    password_rejected: bool,
    continue_clicked: bool,
    sign_in_clicked: bool,
    popover_open: bool,
    delete_armed: bool,
    banner: Option<String>,
    clicks: Vec<String>,
    typed: Vec<(String, String)>,
    navigations: Vec<String>,
    refresh_calls: u32,
    close_calls: u32,
}

/// Fake console: renders scripted rows into slots, walks the popover →
/// delete → confirm sequence, and keeps counters the tests assert on.
pub struct ScriptedSession {
    locators: LocatorSet,
    state: Mutex<State>,
}

impl ScriptedSession {
    pub fn new<I, S>(apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows: Vec<Row> = apps.into_iter().map(|name| Row::App(name.into())).collect();
        Self::with_rows(rows)
    }

    pub fn with_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            locators: LocatorSet::default(),
            state: Mutex::new(State {
                rows: rows.into_iter().collect(),
                ..State::default()
            }),
        }
    }

    pub fn with_bot_challenge(self) -> Self {
        self.state.lock().unwrap().bot_challenge = true;
        self
    }

    pub fn with_unavailable_menu(self) -> Self {
        self.state.lock().unwrap().menu_unavailable = true;
        self
    }

    pub fn rejecting_email(self) -> Self {
        self.state.lock().unwrap().email_rejected = true;
        self
    }

    pub fn rejecting_password(self) -> Self {
        self.state.lock().unwrap().password_rejected = true;
        self
    }

    pub fn close_calls(&self) -> u32 {
        self.state.lock().unwrap().close_calls
    }

    pub fn refresh_calls(&self) -> u32 {
        self.state.lock().unwrap().refresh_calls
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn typed(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().typed.clone()
    }

    pub fn remaining_apps(&self) -> usize {
        let state = self.state.lock().unwrap();
        leading_apps(&state.rows)
    }

    /// Which logical target a selector refers to, if any.
    fn target_of(&self, selector: &Selector) -> Option<&'static str> {
        let l = &self.locators;
        if *selector == l.bot_challenge {
            Some("bot-challenge")
        } else if *selector == l.account_menu {
            Some("account-menu")
        } else if *selector == l.email_field {
            Some("email-field")
        } else if *selector == l.continue_button {
            Some("continue-button")
        } else if *selector == l.error_banner {
            Some("error-banner")
        } else if *selector == l.password_field {
            Some("password-field")
        } else if *selector == l.sign_in_submit {
            Some("sign-in-submit")
        } else if *selector == l.your_apps_link {
            Some("your-apps")
        } else if *selector == l.delete_action {
            Some("delete-action")
        } else if *selector == l.delete_confirm {
            Some("delete-confirm")
        } else if *selector == l.modal_overlay {
            Some("modal-overlay")
        } else if *selector == l.deletion_banner {
            Some("deletion-banner")
        } else {
            None
        }
    }

    fn slot_of(&self, selector: &Selector) -> Option<usize> {
        (0..64).find(|&i| self.locators.slot_action(i) == *selector)
    }
}

fn leading_apps(rows: &VecDeque<Row>) -> usize {
    rows.iter()
        .take_while(|row| matches!(row, Row::App(_)))
        .count()
}

fn timeout(what: &str) -> SweepError {
    SweepError::Timeout(format!("scripted: no {what}"))
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&self, url: &str) -> Result<(), SweepError> {
        self.state.lock().unwrap().navigations.push(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String, SweepError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .navigations
            .last()
            .cloned()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn find_element(&self, selector: &Selector) -> Result<Option<ElementHandle>, SweepError> {
        let Some(slot) = self.slot_of(selector) else {
            return Ok(None);
        };
        let mut state = self.state.lock().unwrap();
        if slot == 0 {
            if matches!(state.rows.front(), Some(Row::Fault(_))) {
                let Some(Row::Fault(err)) = state.rows.pop_front() else {
                    unreachable!()
                };
                return Err(err);
            }
        }
        if slot < leading_apps(&state.rows) {
            Ok(Some(ElementHandle::new(format!("slot-{slot}"))))
        } else {
            Ok(None)
        }
    }

    async fn wait_until(
        &self,
        _condition: WaitCondition,
        selector: &Selector,
        _timeout: Duration,
    ) -> Result<ElementHandle, SweepError> {
        let state = self.state.lock().unwrap();
        let target = match self.target_of(selector) {
            Some(target) => target,
            None => match self.slot_of(selector) {
                Some(slot) if slot < leading_apps(&state.rows) => {
                    return Ok(ElementHandle::new(format!("slot-{slot}")))
                }
                _ => return Err(timeout(&selector.to_string())),
            },
        };
        let present = match target {
            "bot-challenge" => state.bot_challenge,
            "account-menu" => !state.menu_unavailable,
            "error-banner" => {
                (state.continue_clicked && !state.sign_in_clicked && state.email_rejected)
                    || (state.sign_in_clicked && state.password_rejected)
            }
            "delete-action" => state.popover_open,
            "delete-confirm" => state.delete_armed,
            "deletion-banner" => state.banner.is_some(),
            _ => true,
        };
        if present {
            Ok(ElementHandle::new(target))
        } else {
            Err(timeout(target))
        }
    }

    async fn wait_gone(&self, _selector: &Selector, _timeout: Duration) -> Result<(), SweepError> {
        // The scripted overlay never lingers.
        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), SweepError> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(element.id().to_string());
        match element.id() {
            "continue-button" => state.continue_clicked = true,
            "sign-in-submit" => state.sign_in_clicked = true,
            "delete-action" => state.delete_armed = true,
            "delete-confirm" => {
                if !state.delete_armed {
                    return Err(SweepError::StaleElement("confirm without popover".into()));
                }
                match state.rows.pop_front() {
                    Some(Row::App(name)) => {
                        state.banner = Some(name);
                        state.popover_open = false;
                        state.delete_armed = false;
                    }
                    _ => return Err(SweepError::StaleElement("no row to delete".into())),
                }
            }
            id if id.starts_with("slot-") => state.popover_open = true,
            _ => {}
        }
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> Result<(), SweepError> {
        self.state
            .lock()
            .unwrap()
            .typed
            .push((element.id().to_string(), text.to_string()));
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, SweepError> {
        let state = self.state.lock().unwrap();
        match element.id() {
            "deletion-banner" => state
                .banner
                .clone()
                .ok_or_else(|| SweepError::StaleElement("banner already gone".into())),
            "error-banner" => Ok("There was a problem".to_string()),
            other => Ok(other.to_string()),
        }
    }

    async fn scroll_into_view(&self, _element: &ElementHandle) -> Result<(), SweepError> {
        Ok(())
    }

    async fn page_up(&self) -> Result<(), SweepError> {
        Ok(())
    }

    async fn refresh(&self) -> Result<(), SweepError> {
        self.state.lock().unwrap().refresh_calls += 1;
        Ok(())
    }

    async fn close(&self) -> Result<(), SweepError> {
        self.state.lock().unwrap().close_calls += 1;
        Ok(())
    }
}

/// Event sink that records everything it sees.
#[derive(Default)]
pub struct RecordingSink {
    deletions: Mutex<Vec<String>>,
    retries: Mutex<Vec<u32>>,
    idle_stops: Mutex<Vec<u64>>,
}

impl RecordingSink {
    pub fn deletions(&self) -> Vec<String> {
        self.deletions.lock().unwrap().clone()
    }

    pub fn retries(&self) -> Vec<u32> {
        self.retries.lock().unwrap().clone()
    }

    pub fn idle_stops(&self) -> Vec<u64> {
        self.idle_stops.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn deletion(&self, record: &DeletionRecord) {
        self.deletions.lock().unwrap().push(record.name.clone());
    }

    fn sweep_retry(&self, attempt: u32, _max: u32, _error: &SweepError) {
        self.retries.lock().unwrap().push(attempt);
    }

    fn idle_stop(&self, total: u64) {
        self.idle_stops.lock().unwrap().push(total);
    }
}

/// Config with real-time knobs shrunk so the tests finish quickly.
pub fn fast_config() -> SweepConfig {
    SweepConfig {
        slot_count: 10,
        banner_wait: Duration::from_millis(10),
        nav_wait: Duration::from_millis(50),
        action_wait: Duration::from_millis(50),
        page_settle: Duration::ZERO,
        confirm_settle: Duration::ZERO,
        rescroll_settle: Duration::from_millis(1),
        idle_threshold: Duration::from_millis(150),
        max_retries: 3,
        retry_backoff: Duration::from_millis(1),
    }
}
