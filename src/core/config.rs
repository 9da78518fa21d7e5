use crate::core::error::SessionError;
use crate::scraping::rules::{AffordanceRules, ExtractionRules};
use crate::scraping::wait::{PollPolicy, Settle};
use crate::tools::scroll::ScrollPolicy;
use crate::tools::triggers::TriggerPacing;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ScoutConfig: file-based config loader (feed-scout.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG: &str = "FEED_SCOUT_CONFIG";
pub const ENV_MAX_SCROLLS: &str = "FEED_SCOUT_MAX_SCROLLS";
pub const ENV_STABLE_TICKS: &str = "FEED_SCOUT_STABLE_TICKS";
pub const ENV_SCROLL_PAUSE_MS: &str = "FEED_SCOUT_SCROLL_PAUSE_MS";
pub const ENV_COOKIE_PATH: &str = "FEED_SCOUT_COOKIE_PATH";
pub const ENV_HEADLESS: &str = "FEED_SCOUT_HEADLESS";
pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";
pub const ENV_EMAIL: &str = "LINKEDIN_EMAIL";
pub const ENV_PASSWORD: &str = "LINKEDIN_PASSWORD";

/// Scroll sub-config (mirrors the `scroll` key in feed-scout.json).
#[derive(Deserialize, Default, Clone, Debug)]
pub struct ScrollSection {
    /// Height-growing scrolls before stopping. Default: 2.
    pub max_scrolls: Option<u32>,
    /// Consecutive unchanged heights that end scrolling. Default: 3.
    pub stable_ticks: Option<u32>,
    /// Pause after each scroll. Default: fixed 1500 ms.
    pub settle: Option<Settle>,
}

impl ScrollSection {
    /// JSON fields → `FEED_SCOUT_*` env vars → built-in defaults.
    pub fn resolve(&self) -> ScrollPolicy {
        let defaults = ScrollPolicy::default();
        ScrollPolicy {
            max_scrolls: self
                .max_scrolls
                .or_else(|| env_parse(ENV_MAX_SCROLLS))
                .unwrap_or(defaults.max_scrolls),
            stable_ticks: self
                .stable_ticks
                .or_else(|| env_parse(ENV_STABLE_TICKS))
                .unwrap_or(defaults.stable_ticks)
                .max(1),
            settle: self
                .settle
                .or_else(|| env_parse(ENV_SCROLL_PAUSE_MS).map(Settle::fixed))
                .unwrap_or(defaults.settle),
        }
    }
}

/// Pacing around affordance activation (the `pacing` key).
#[derive(Deserialize, Default, Clone, Debug)]
pub struct PacingSection {
    /// Pause between scrolling an element into view and activating it. Default: 500 ms.
    pub reveal_ms: Option<u64>,
    /// Pause after activating a comment toggle or "load more". Default: 1500 ms.
    pub after_activate_ms: Option<u64>,
    /// Pause after activating a "see more" toggle. Default: 1000 ms.
    pub see_more_ms: Option<u64>,
    /// When set, post-activation pauses poll for a stable page height instead
    /// of sleeping a fixed duration.
    pub poll: Option<PollPolicy>,
    /// Optional ceiling on "load more comments" rounds. Unset: run to a fixed point.
    pub max_load_more_rounds: Option<usize>,
}

impl PacingSection {
    fn after(&self, fixed_ms: u64) -> Settle {
        match self.poll {
            Some(policy) => Settle::Poll(policy),
            None => Settle::fixed(fixed_ms),
        }
    }

    pub fn resolve(&self) -> TriggerPacing {
        TriggerPacing {
            reveal: Settle::fixed(self.reveal_ms.unwrap_or(500)),
            after_activate: self.after(self.after_activate_ms.unwrap_or(1500)),
        }
    }

    pub fn resolve_see_more(&self) -> TriggerPacing {
        TriggerPacing {
            reveal: Settle::fixed(self.reveal_ms.unwrap_or(500)),
            after_activate: self.after(self.see_more_ms.unwrap_or(1000)),
        }
    }
}

/// Browser session sub-config (the `session` key).
#[derive(Deserialize, Default, Clone, Debug)]
pub struct SessionSection {
    /// Stored cookie jar. Default: `~/.feed-scout/sessions/linkedin_com.json`.
    pub cookie_path: Option<String>,
    /// Run the browser without a window. Default: false (login may need a human).
    pub headless: Option<bool>,
    /// Wait for the operator to press Enter after submitting the login form
    /// (CAPTCHA / 2FA). Default: true.
    pub operator_checkpoint: Option<bool>,
    /// Pause after opening the search results page. Default: 5000 ms.
    pub navigation_settle_ms: Option<u64>,
}

impl SessionSection {
    /// Cookie path: JSON field → `FEED_SCOUT_COOKIE_PATH` env var → home default.
    pub fn resolve_cookie_path(&self) -> Option<PathBuf> {
        if let Some(p) = non_empty(self.cookie_path.as_deref()) {
            return Some(PathBuf::from(p));
        }
        if let Ok(p) = std::env::var(ENV_COOKIE_PATH) {
            if let Some(p) = non_empty(Some(&p)) {
                return Some(PathBuf::from(p));
            }
        }
        let home = dirs::home_dir()?;
        Some(
            home.join(".feed-scout")
                .join("sessions")
                .join("linkedin_com.json"),
        )
    }

    /// Headless: JSON field → `FEED_SCOUT_HEADLESS` env var → false.
    pub fn resolve_headless(&self) -> bool {
        if let Some(b) = self.headless {
            return b;
        }
        std::env::var(ENV_HEADLESS)
            .map(|v| is_truthy(&v))
            .unwrap_or(false)
    }

    pub fn resolve_operator_checkpoint(&self) -> bool {
        self.operator_checkpoint.unwrap_or(true)
    }

    pub fn resolve_navigation_settle_ms(&self) -> u64 {
        self.navigation_settle_ms.unwrap_or(5000)
    }
}

/// Top-level config loaded from `feed-scout.json`.
#[derive(Deserialize, Default, Clone, Debug)]
#[serde(default)]
pub struct ScoutConfig {
    pub scroll: ScrollSection,
    pub pacing: PacingSection,
    pub session: SessionSection,
    pub rules: ExtractionRules,
    pub affordances: AffordanceRules,
}

/// Load `feed-scout.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `explicit` (the `--config` flag)
/// 2. `FEED_SCOUT_CONFIG` env var path
/// 3. `./feed-scout.json`
/// 4. `../feed-scout.json`
///
/// Missing file → `ScoutConfig::default()` (silent, env-var fallbacks apply).
/// Parse error → log a warning, return `ScoutConfig::default()`.
pub fn load_config(explicit: Option<&Path>) -> ScoutConfig {
    let mut candidates: Vec<PathBuf> = vec![
        PathBuf::from("feed-scout.json"),
        PathBuf::from("../feed-scout.json"),
    ];
    if let Ok(env_path) = std::env::var(ENV_CONFIG) {
        candidates.insert(0, PathBuf::from(env_path));
    }
    if let Some(path) = explicit {
        candidates.insert(0, path.to_path_buf());
    }

    for path in &candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        return match serde_json::from_str::<ScoutConfig>(&contents) {
            Ok(cfg) => {
                tracing::info!("feed-scout.json loaded from {}", path.display());
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    "feed-scout.json parse error at {}: {} - using defaults",
                    path.display(),
                    e
                );
                ScoutConfig::default()
            }
        };
    }

    ScoutConfig::default()
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Login credentials. `Debug` never prints the password.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read `LINKEDIN_EMAIL` / `LINKEDIN_PASSWORD`. Call `dotenvy::dotenv()` first
    /// to pick up a `.env` file.
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_values(
            std::env::var(ENV_EMAIL).ok(),
            std::env::var(ENV_PASSWORD).ok(),
        )
    }

    pub fn from_values(
        email: Option<String>,
        password: Option<String>,
    ) -> Result<Self, SessionError> {
        match (
            non_empty(email.as_deref()),
            non_empty(password.as_deref()),
        ) {
            (Some(email), Some(password)) => Ok(Self {
                email: email.to_string(),
                password: password.to_string(),
            }),
            _ => Err(SessionError::MissingCredentials),
        }
    }
}

/// Optional override for the Chromium-family browser executable.
///
/// Default behavior is auto-discovery (see
/// `scraping::browser_manager::find_chrome_executable()`). Only returns a value
/// when `CHROME_EXECUTABLE` is set to an existing path.
pub fn chrome_executable_override() -> Option<String> {
    let p = std::env::var(ENV_CHROME_EXECUTABLE).ok()?;
    let p = p.trim();
    if p.is_empty() {
        return None;
    }
    if Path::new(p).exists() {
        Some(p.to_string())
    } else {
        None
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

fn is_truthy(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
