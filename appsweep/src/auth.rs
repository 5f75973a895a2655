use tracing::{debug, info, instrument, warn};

use crate::config::SweepConfig;
use crate::errors::{FailureClass, SweepError};
use crate::page::LocatorSet;
use crate::session::{BrowserSession, WaitCondition};
use crate::Credentials;

/// Login sequence progress. Linear, with fatal short-circuits out of
/// `EmailEntry` and `PasswordEntry` when the error banner shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthState {
    Initial,
    EmailEntry,
    PasswordEntry,
    PostLogin,
    Authenticated,
}

/// Drives the login sequence against the browser session.
pub struct Authenticator<'a> {
    locators: &'a LocatorSet,
    config: &'a SweepConfig,
}

impl<'a> Authenticator<'a> {
    pub fn new(locators: &'a LocatorSet, config: &'a SweepConfig) -> Self {
        Self { locators, config }
    }

    /// Sign in and navigate to the account's application list.
    ///
    /// An "Incorrect email" or "Incorrect password" banner is fatal and
    /// propagates. Any other structural or transient hiccup along the way is
    /// logged and soft-continued, matching how the console intermittently
    /// re-renders the login flow.
    #[instrument(skip_all)]
    pub async fn authenticate(
        &self,
        session: &dyn BrowserSession,
        credentials: &Credentials,
    ) -> Result<(), SweepError> {
        self.open_landing(session).await;

        match self.sign_in(session, credentials).await {
            Ok(()) => {
                info!("authenticated and on the apps page");
                Ok(())
            }
            Err(err) => match FailureClass::of(&err) {
                FailureClass::Fatal => Err(err),
                class => {
                    warn!(error = %err, ?class, "login step failed, continuing anyway");
                    Ok(())
                }
            },
        }
    }

    /// Open the landing page and dismiss the bot-challenge interstitial if
    /// it shows up. A failed landing navigation falls back to the alternate
    /// entry URL once.
    async fn open_landing(&self, session: &dyn BrowserSession) {
        if let Err(err) = session.navigate(&self.locators.landing_url).await {
            warn!(error = %err, "landing navigation failed, trying alternate entry");
            if let Err(err) = session.navigate(&self.locators.fallback_url).await {
                warn!(error = %err, "alternate entry navigation failed too");
                return;
            }
            // The fallback URL bounces to the landing page when the site is
            // healthy; renavigate if it did not.
            match session.current_url().await {
                Ok(url) if url == self.locators.fallback_url => {
                    if let Err(err) = session.navigate(&self.locators.landing_url).await {
                        warn!(error = %err, "renavigation to landing page failed");
                    }
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "could not read current url"),
            }
        }
        self.dismiss_bot_challenge(session).await;
    }

    async fn dismiss_bot_challenge(&self, session: &dyn BrowserSession) {
        match session
            .wait_until(
                WaitCondition::Clickable,
                &self.locators.bot_challenge,
                self.config.banner_wait,
            )
            .await
        {
            Ok(challenge) => {
                info!("bot challenge present, requesting a fresh page");
                if let Err(err) = session.click(&challenge).await {
                    warn!(error = %err, "failed to dismiss bot challenge");
                }
            }
            // Absent most of the time; not an error.
            Err(err) => debug!(error = %err, "no bot challenge"),
        }
    }

    async fn sign_in(
        &self,
        session: &dyn BrowserSession,
        credentials: &Credentials,
    ) -> Result<(), SweepError> {
        let mut state = AuthState::Initial;

        self.advance(&mut state, AuthState::EmailEntry);
        let menu = session
            .wait_until(
                WaitCondition::Clickable,
                &self.locators.account_menu,
                self.config.nav_wait,
            )
            .await?;
        session.click(&menu).await?;
        let email = session
            .wait_until(
                WaitCondition::Clickable,
                &self.locators.email_field,
                self.config.nav_wait,
            )
            .await?;
        session.type_text(&email, &credentials.username).await?;
        let submit = session
            .wait_until(
                WaitCondition::Clickable,
                &self.locators.continue_button,
                self.config.nav_wait,
            )
            .await?;
        session.click(&submit).await?;
        if let Some(message) = self.error_banner_text(session).await {
            return Err(SweepError::InvalidEmail(message));
        }
        debug!("email accepted");

        self.advance(&mut state, AuthState::PasswordEntry);
        let password = session
            .wait_until(
                WaitCondition::Clickable,
                &self.locators.password_field,
                self.config.nav_wait,
            )
            .await?;
        session.type_text(&password, &credentials.password).await?;
        let submit = session
            .wait_until(
                WaitCondition::Clickable,
                &self.locators.sign_in_submit,
                self.config.nav_wait,
            )
            .await?;
        session.click(&submit).await?;
        if let Some(message) = self.error_banner_text(session).await {
            return Err(SweepError::InvalidPassword(message));
        }
        debug!("password accepted");

        self.advance(&mut state, AuthState::PostLogin);
        let menu = session
            .wait_until(
                WaitCondition::Clickable,
                &self.locators.account_menu,
                self.config.nav_wait,
            )
            .await?;
        session.click(&menu).await?;
        let your_apps = session
            .wait_until(
                WaitCondition::Clickable,
                &self.locators.your_apps_link,
                self.config.nav_wait,
            )
            .await?;
        session.scroll_into_view(&your_apps).await?;
        session.click(&your_apps).await?;
        // Let the apps list render before the first sweep.
        tokio::time::sleep(self.config.page_settle).await;

        self.advance(&mut state, AuthState::Authenticated);
        Ok(())
    }

    /// Short bounded check for the "There was a problem" banner. Returns its
    /// text when present; absence (the normal case) is a timeout.
    async fn error_banner_text(&self, session: &dyn BrowserSession) -> Option<String> {
        let banner = session
            .wait_until(
                WaitCondition::Present,
                &self.locators.error_banner,
                self.config.banner_wait,
            )
            .await
            .ok()?;
        Some(
            session
                .text(&banner)
                .await
                .unwrap_or_else(|_| "There was a problem".to_string()),
        )
    }

    fn advance(&self, state: &mut AuthState, next: AuthState) {
        debug!(from = ?state, to = ?next, "auth state transition");
        *state = next;
    }
}
