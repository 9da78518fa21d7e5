//! Native browser management using `chromiumoxide`.
//!
//! * Finding a usable browser executable (Brave → Chrome → Chromium, cross-platform).
//! * Building the launch config (headed by default: the login step may need a human).
//! * [`BrowserSession`]: one browser, one tab, and the CDP event pump that drives them.

use crate::core::config::chrome_executable_override;
use crate::core::error::SessionError;
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub const DEFAULT_WIDTH: u32 = 1366;
pub const DEFAULT_HEIGHT: u32 = 900;

// ── Browser executable discovery ─────────────────────────────────────────────

const PATH_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
    "brave-browser",
    "brave",
];

#[cfg(target_os = "macos")]
const WELL_KNOWN_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
];

#[cfg(target_os = "linux")]
const WELL_KNOWN_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/usr/local/bin/chromium",
    "/snap/bin/chromium",
    "/usr/bin/brave-browser",
];

#[cfg(target_os = "windows")]
const WELL_KNOWN_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\BraveSoftware\Brave-Browser\Application\brave.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const WELL_KNOWN_PATHS: &[&str] = &[];

/// Find a usable Chromium-family browser executable.
///
/// Resolution order:
/// 1. `CHROME_EXECUTABLE` env var (explicit override)
/// 2. PATH scan
/// 3. OS-specific well-known install paths
pub fn find_chrome_executable() -> Option<String> {
    if let Some(p) = chrome_executable_override() {
        return Some(p);
    }

    if let Ok(path_var) = std::env::var("PATH") {
        for dir in std::env::split_paths(&path_var) {
            for exe in PATH_CANDIDATES {
                let full = dir.join(exe);
                if full.is_file() {
                    return Some(full.to_string_lossy().to_string());
                }
            }
        }
    }

    WELL_KNOWN_PATHS
        .iter()
        .find(|c| Path::new(c).exists())
        .map(|c| c.to_string())
}

// ── Launch config ────────────────────────────────────────────────────────────

/// Build a `BrowserConfig` for the feed session.
///
/// Headed unless `headless` is set, so an operator can solve a CAPTCHA or
/// a two-factor prompt during login.
pub fn build_session_config(
    exe: &str,
    headless: bool,
    width: u32,
    height: u32,
) -> Result<BrowserConfig, SessionError> {
    let mut builder = BrowserConfig::builder()
        .chrome_executable(exe)
        .viewport(Viewport {
            width,
            height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(width, height)
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-sync")
        .arg("--disable-translate")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--mute-audio");

    if !headless {
        builder = builder.with_head();
    }

    builder.build().map_err(SessionError::BrowserLaunchFailed)
}

// ── Session ──────────────────────────────────────────────────────────────────

/// A launched browser with the single tab the harvester drives.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Discover the executable, launch it and open a blank tab.
    pub async fn launch(headless: bool) -> Result<Self, SessionError> {
        let exe = find_chrome_executable().ok_or(SessionError::BrowserNotFound)?;
        info!(
            "🚀 launching browser ({}, {})",
            exe,
            if headless { "headless" } else { "headed" }
        );

        let config = build_session_config(&exe, headless, DEFAULT_WIDTH, DEFAULT_HEIGHT)?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::BrowserLaunchFailed(format!("{} ({})", e, exe)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("CDP handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                browser.close().await.ok();
                handler_task.abort();
                return Err(SessionError::BrowserLaunchFailed(format!(
                    "failed to open tab: {}",
                    e
                )));
            }
        };

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Close the browser and stop the event pump. Errors are logged, not returned.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Browser close error (non-fatal): {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Browser wait error (non-fatal): {}", e);
        }
        self.handler_task.abort();
        info!("🛑 browser closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_paths_are_absolute() {
        for p in WELL_KNOWN_PATHS {
            assert!(Path::new(p).is_absolute(), "{p} is not absolute");
        }
    }

    #[test]
    fn test_discovered_executable_exists() {
        if let Some(exe) = find_chrome_executable() {
            assert!(Path::new(&exe).exists());
        }
    }
}
