use thiserror::Error;

/// Invalid extraction or affordance configuration.
///
/// Raised once, when [`crate::scraping::rules`] compiles user-supplied
/// selectors and label patterns. Extraction itself never fails.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("invalid CSS selector for `{field}` ({selector}): {reason}")]
    Selector {
        field: &'static str,
        selector: String,
        reason: String,
    },

    #[error("invalid pattern for `{field}`: {source}")]
    Pattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Fatal conditions of the session layer. These stop the run before the
/// harvesting pipeline starts.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("missing LinkedIn credentials: set LINKEDIN_EMAIL and LINKEDIN_PASSWORD (a .env file works)")]
    MissingCredentials,

    #[error("login failed or CAPTCHA not passed (landed on {0})")]
    LoginRejected(String),

    #[error("no browser found: install Chrome, Chromium or Brave, or set CHROME_EXECUTABLE")]
    BrowserNotFound,

    #[error("browser launch failed: {0}")]
    BrowserLaunchFailed(String),
}
