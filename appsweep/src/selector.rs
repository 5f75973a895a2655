use std::fmt;

/// Represents ways to locate an element on the console page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Select using an XPath query
    XPath(String),
    /// Select using a CSS selector
    Css(String),
    /// Select by element id
    Id(String),
    /// Select by class name
    ClassName(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::XPath(s) => write!(f, "xpath:{s}"),
            Selector::Css(s) => write!(f, "css:{s}"),
            Selector::Id(s) => write!(f, "id:{s}"),
            Selector::ClassName(s) => write!(f, "classname:{s}"),
        }
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        match s {
            _ if s.starts_with("xpath:") => Selector::XPath(s[6..].to_string()),
            _ if s.starts_with("css:") => Selector::Css(s[4..].to_string()),
            _ if s.starts_with("id:") => Selector::Id(s[3..].to_string()),
            _ if s.to_lowercase().starts_with("classname:") => {
                Selector::ClassName(s["classname:".len()..].to_string())
            }
            _ if s.starts_with('#') => Selector::Id(s[1..].to_string()),
            _ if s.starts_with('/') || s.starts_with('(') => Selector::XPath(s.to_string()),
            _ => Selector::Css(s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_selectors() {
        assert_eq!(
            Selector::from("xpath://div[@id='x']"),
            Selector::XPath("//div[@id='x']".to_string())
        );
        assert_eq!(
            Selector::from("css:.a-popover-content"),
            Selector::Css(".a-popover-content".to_string())
        );
        assert_eq!(Selector::from("id:continue"), Selector::Id("continue".to_string()));
        assert_eq!(
            Selector::from("classname:a-modal-scroller"),
            Selector::ClassName("a-modal-scroller".to_string())
        );
    }

    #[test]
    fn parses_bare_selectors() {
        assert_eq!(Selector::from("#ap_email"), Selector::Id("ap_email".to_string()));
        assert_eq!(
            Selector::from("//input[@type='submit']"),
            Selector::XPath("//input[@type='submit']".to_string())
        );
        assert_eq!(
            Selector::from("div.banner"),
            Selector::Css("div.banner".to_string())
        );
    }
}
