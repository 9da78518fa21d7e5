//! LinkedIn session: topic handling, login and cookie-backed re-authentication.

use super::session_store;
use crate::core::config::{Credentials, SessionSection};
use crate::core::error::SessionError;
use crate::scraping::wait::pause;
use anyhow::{anyhow, Result};
use chromiumoxide::Page;
use std::io::BufRead;
use tracing::{info, warn};

pub const LOGIN_URL: &str = "https://www.linkedin.com/login";
pub const FEED_URL: &str = "https://www.linkedin.com/feed/";
const SEARCH_BASE: &str = "https://www.linkedin.com/search/results/content/";

/// Strip surrounding whitespace and any `#` marks from a user-supplied topic.
///
/// `" #rust "` → `"rust"`
pub fn normalize_topic(raw: &str) -> String {
    raw.trim().replace('#', "")
}

/// Content-search URL for a hashtag topic.
pub fn search_url(topic: &str) -> Result<url::Url> {
    url::Url::parse_with_params(
        SEARCH_BASE,
        &[
            ("keywords", format!("#{}", topic)),
            ("origin", "SWITCH_SEARCH_VERTICAL".to_string()),
        ],
    )
    .map_err(|e| anyhow!("invalid search url for '{}': {}", topic, e))
}

/// Whether a post-login URL means the login went through.
pub fn landed_on_feed(url: &str) -> bool {
    url.contains("feed")
}

async fn current_url(page: &Page) -> String {
    page.url().await.ok().flatten().unwrap_or_default()
}

/// Block until the operator presses Enter.
async fn operator_checkpoint() {
    println!("Login and solve CAPTCHA if required, then press Enter to continue...");
    let waited = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)
    })
    .await;
    match waited {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!("checkpoint: could not read stdin ({}), continuing", e),
        Err(e) => warn!("checkpoint: prompt task failed ({}), continuing", e),
    }
}

/// Fill and submit the login form, then verify that the browser ends up on
/// the feed.
///
/// With `checkpoint` set, waits for the operator to confirm (CAPTCHA or
/// two-factor prompts) before checking the landing URL.
pub async fn login(page: &Page, creds: &Credentials, checkpoint: bool) -> Result<()> {
    info!("🔐 logging in as {}", creds.email);
    page.goto(LOGIN_URL)
        .await
        .map_err(|e| anyhow!("failed to open login page: {}", e))?;
    pause(2000).await;

    page.find_element("#username")
        .await
        .map_err(|e| anyhow!("login form has no username field: {}", e))?
        .click()
        .await?
        .type_str(&creds.email)
        .await?;

    page.find_element("#password")
        .await
        .map_err(|e| anyhow!("login form has no password field: {}", e))?
        .click()
        .await?
        .type_str(&creds.password)
        .await?
        .press_key("Enter")
        .await?;

    if checkpoint {
        operator_checkpoint().await;
    }
    pause(5000).await;

    let landed = current_url(page).await;
    if !landed_on_feed(&landed) {
        return Err(SessionError::LoginRejected(landed).into());
    }
    info!("Logged in successfully");
    Ok(())
}

/// Make sure the tab is authenticated.
///
/// Stored cookies are tried first; if the feed opens with them, no login is
/// needed. Otherwise credentials are read from the environment, the login
/// form is submitted and the fresh cookies are saved for the next run.
pub async fn ensure_authenticated(page: &Page, config: &SessionSection) -> Result<()> {
    let cookie_path = config.resolve_cookie_path();

    if let Some(path) = cookie_path.as_deref() {
        if session_store::restore(page, path).await > 0 {
            page.goto(FEED_URL)
                .await
                .map_err(|e| anyhow!("failed to open feed: {}", e))?;
            pause(3000).await;
            let landed = current_url(page).await;
            if landed_on_feed(&landed) {
                info!("♻️  reusing stored session");
                return Ok(());
            }
            info!("stored session rejected (landed on {}), logging in", landed);
            session_store::invalidate(path);
        }
    }

    let creds = Credentials::from_env()?;
    login(page, &creds, config.resolve_operator_checkpoint()).await?;

    if let Some(path) = cookie_path.as_deref() {
        if let Err(e) = session_store::persist(page, path).await {
            warn!("could not save session cookies: {}", e);
        }
    }
    Ok(())
}
