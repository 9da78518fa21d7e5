//! Feed scroll driver: grow an infinite-scroll feed until its height stops
//! changing or the scroll ceiling is hit.

use crate::scraping::surface::LiveSurface;
use crate::scraping::wait::{self, Settle};
use crate::types::{ScrollReport, ScrollTermination};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollPolicy {
    /// Successful (height-growing) scrolls before giving up on the feed.
    pub max_scrolls: u32,
    /// Consecutive non-growing ticks that count as "feed exhausted".
    pub stable_ticks: u32,
    pub settle: Settle,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self {
            max_scrolls: 2,
            stable_ticks: 3,
            settle: Settle::fixed(1500),
        }
    }
}

/// Scroll to the bottom repeatedly until the feed stops growing.
pub async fn scroll_feed<S: LiveSurface>(surface: &S, policy: &ScrollPolicy) -> ScrollReport {
    let mut last_height = match surface.document_height().await {
        Ok(h) => h,
        Err(e) => {
            warn!("scroll: cannot read initial page height: {}", e);
            return ScrollReport {
                ticks: 0,
                scroll_count: 0,
                final_height: 0,
                termination: ScrollTermination::Interrupted,
            };
        }
    };
    let mut no_change_count = 0u32;
    let mut scroll_count = 0u32;
    let mut ticks = 0u32;

    let termination = loop {
        if no_change_count >= policy.stable_ticks {
            break ScrollTermination::Stabilized;
        }
        if scroll_count >= policy.max_scrolls {
            break ScrollTermination::Ceiling;
        }

        ticks += 1;
        if let Err(e) = surface.scroll_to_bottom().await {
            warn!("scroll: scroll command failed: {}", e);
        }
        wait::settle(surface, &policy.settle).await;

        let new_height = match surface.document_height().await {
            Ok(h) => h,
            Err(e) => {
                warn!("scroll: cannot read page height: {}", e);
                break ScrollTermination::Interrupted;
            }
        };

        if new_height == last_height {
            no_change_count += 1;
        } else {
            no_change_count = 0;
            last_height = new_height;
            scroll_count += 1;
            info!("[Scroll] {}/{} (height {})", scroll_count, policy.max_scrolls, new_height);
        }
    };

    info!(
        "scroll: finished after {} ticks ({:?}), final height {}",
        ticks, termination, last_height
    );
    ScrollReport {
        ticks,
        scroll_count,
        final_height: last_height,
        termination,
    }
}
