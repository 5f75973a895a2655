use crate::selector::Selector;

/// Fixed mapping from logical UI targets to lookup strategies.
///
/// The defaults carry the console's current markup; when the site changes,
/// this is the only place that needs to move. The engine itself never spells
/// out an XPath.
#[derive(Debug, Clone)]
pub struct LocatorSet {
    /// Landing page of the site.
    pub landing_url: String,
    /// Alternate entry URL used when the landing navigation fails structurally.
    pub fallback_url: String,
    /// Bot-challenge interstitial; optional and intermittent.
    pub bot_challenge: Selector,
    /// Account menu affordance in the top navigation.
    pub account_menu: Selector,
    pub email_field: Selector,
    pub continue_button: Selector,
    /// "There was a problem" banner shown for bad email or password.
    pub error_banner: Selector,
    pub password_field: Selector,
    pub sign_in_submit: Selector,
    /// "Your apps" navigation target inside the account menu.
    pub your_apps_link: Selector,
    /// "Delete this app" affordance inside the row popover.
    pub delete_action: Selector,
    /// Confirmation control inside the delete dialog.
    pub delete_confirm: Selector,
    /// Modal overlay that swallows clicks while animating.
    pub modal_overlay: Selector,
    /// Banner naming the app that was just deleted.
    pub deletion_banner: Selector,
    /// Prefix pattern for per-row action control ids.
    slot_id_prefix: String,
}

impl LocatorSet {
    /// Action control locator for the given row slot.
    ///
    /// Slots are synthetic: the console re-renders remaining rows into the
    /// same id sequence after each deletion, so a fixed upper bound of slots
    /// stands in for the (unknown) real list length.
    pub fn slot_action(&self, slot: usize) -> Selector {
        Selector::XPath(format!(
            "//*[starts-with(@id, '{}{}-announce')]",
            self.slot_id_prefix, slot
        ))
    }
}

impl Default for LocatorSet {
    fn default() -> Self {
        Self {
            landing_url: "https://www.amazon.com/".into(),
            fallback_url: "https://www.amazon.com/gp/site-directory?ref=nav_em_linktree_fail"
                .into(),
            bot_challenge: Selector::XPath(
                r#"//*[contains(text(),"Try different image") and @onclick="window.location.reload()"]"#
                    .into(),
            ),
            account_menu: Selector::XPath("//*[contains(@id, 'nav-link-accountList')]".into()),
            email_field: Selector::XPath(
                "//*[@type='email' and @id='ap_email' and @name='email']".into(),
            ),
            continue_button: Selector::XPath(
                "//*[@id='continue' and @type='submit' and contains(@class, 'a-button-input')]"
                    .into(),
            ),
            error_banner: Selector::XPath(
                "//div[@class='a-box-inner a-alert-container']//h4[@class='a-alert-heading' and text()='There was a problem']"
                    .into(),
            ),
            password_field: Selector::XPath(
                "//*[@type='password' and @id='ap_password' and @name='password']".into(),
            ),
            sign_in_submit: Selector::XPath(
                "//*[@id='signInSubmit' and @type='submit' and contains(@class, 'a-button-input')]"
                    .into(),
            ),
            your_apps_link: Selector::XPath(
                "//a[contains(@href, 'amazon.com/gp/mas/your-account/myapps') and contains(text(), 'Your apps')]"
                    .into(),
            ),
            delete_action: Selector::XPath(
                "//*[@class='a-popover-content']//a[@class='a-link-normal' and normalize-space()='Delete this app']"
                    .into(),
            ),
            delete_confirm: Selector::XPath(
                "//input[@class='a-button-input' and @type='submit' and @aria-labelledby='primary_button-announce']"
                    .into(),
            ),
            modal_overlay: Selector::ClassName("a-modal-scroller".into()),
            deletion_banner: Selector::XPath(
                "//div[contains(@class, 'a-box-inner') and contains(@class, 'a-alert-container')]"
                    .into(),
            ),
            slot_id_prefix: "a-autoid-".into(),
        }
    }
}
