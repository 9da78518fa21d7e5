//! Session cookie persistence.
//!
//! After a successful login the browser cookies are saved to the configured
//! cookie path (default `~/.feed-scout/sessions/linkedin_com.json`). The next
//! run restores them into the tab before navigation so it starts
//! authenticated, without typing credentials or passing a CAPTCHA again.

use anyhow::{anyhow, Result};
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, SetCookiesParams};
use chromiumoxide::Page;
use std::path::Path;
use tracing::{info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Expiry
// ─────────────────────────────────────────────────────────────────────────────

/// Whether a stored jar is certainly stale at `now` (unix seconds): every
/// persistent cookie has expired. Session-only jars are never considered stale
/// here; the feed check after restore decides. CDP reports `expires == -1`
/// for session-scoped cookies.
pub fn jar_expired(raw_cookies: &[serde_json::Value], now: f64) -> bool {
    let persistent: Vec<f64> = raw_cookies
        .iter()
        .filter_map(|v| v.get("expires").and_then(|e| e.as_f64()))
        .filter(|&exp| exp > 0.0)
        .collect();
    !persistent.is_empty() && persistent.iter().all(|&exp| exp <= now)
}

// ─────────────────────────────────────────────────────────────────────────────
// Load / remove
// ─────────────────────────────────────────────────────────────────────────────

/// Load stored cookies as raw JSON values.
///
/// `None` when the file is missing, unreadable, malformed or empty.
pub fn load_raw(path: &Path) -> Option<Vec<serde_json::Value>> {
    let content = std::fs::read_to_string(path).ok()?;
    let cookies: Vec<serde_json::Value> = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!(
                "session_store: ignoring malformed cookie file {}: {}",
                path.display(),
                e
            );
            return None;
        }
    };
    if cookies.is_empty() {
        return None;
    }
    info!(
        "session_store: 🍪 loaded {} cookies ({})",
        cookies.len(),
        path.display()
    );
    Some(cookies)
}

/// Remove a stale cookie file so the next run logs in afresh.
pub fn invalidate(path: &Path) {
    if !path.exists() {
        return;
    }
    match std::fs::remove_file(path) {
        Ok(()) => info!("session_store: 🗑️  removed stale session ({})", path.display()),
        Err(e) => warn!(
            "session_store: failed to remove session file {}: {}",
            path.display(),
            e
        ),
    }
}

/// Cookie entries that deserialize into CDP `CookieParam`s. Malformed entries
/// are skipped so a partially broken file never blocks a run.
pub fn to_cookie_params(raw_cookies: &[serde_json::Value]) -> Vec<CookieParam> {
    raw_cookies
        .iter()
        .filter_map(|v| serde_json::from_value::<CookieParam>(v.clone()).ok())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Restore / persist
// ─────────────────────────────────────────────────────────────────────────────

/// Inject stored cookies into `page`. Call **before** navigating so they ride
/// on the first request. Returns the number of cookies injected (0 when there
/// is nothing usable on disk).
pub async fn restore(page: &Page, path: &Path) -> usize {
    let Some(raw) = load_raw(path) else {
        return 0;
    };

    let now = chrono::Utc::now().timestamp() as f64;
    if jar_expired(&raw, now) {
        info!("session_store: stored session has expired");
        invalidate(path);
        return 0;
    }

    let params = to_cookie_params(&raw);
    if params.is_empty() {
        warn!("session_store: stored session contained no valid cookies - skipping injection");
        return 0;
    }

    let count = params.len();
    match page.execute(SetCookiesParams::new(params)).await {
        Ok(_) => {
            info!("session_store: 💉 injected {} session cookies", count);
            count
        }
        Err(e) => {
            warn!("session_store: failed to inject session cookies: {}", e);
            0
        }
    }
}

/// Save the tab's current cookies to `path`, creating parent directories.
pub async fn persist(page: &Page, path: &Path) -> Result<usize> {
    let cookies = page
        .get_cookies()
        .await
        .map_err(|e| anyhow!("failed to read browser cookies: {}", e))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow!("failed to create {}: {}", parent.display(), e))?;
    }
    let json = serde_json::to_string_pretty(&cookies)?;
    std::fs::write(path, json).map_err(|e| anyhow!("failed to write {}: {}", path.display(), e))?;

    info!(
        "session_store: 💾 saved {} cookies ({})",
        cookies.len(),
        path.display()
    );
    Ok(cookies.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
