//! Pipeline orchestration: scroll → expand → snapshot → assemble.
//!
//! Each stage runs to completion before the next one starts, because the
//! assembler only sees what earlier expansion has already materialized.

use crate::core::config::ScoutConfig;
use crate::core::error::RulesError;
use crate::scraping::assemble::assemble_posts;
use crate::scraping::rules::{AffordanceSet, CompiledRules};
use crate::scraping::surface::LiveSurface;
use crate::tools::scroll::{scroll_feed, ScrollPolicy};
use crate::tools::triggers::{trigger_once, trigger_until_exhausted, TriggerPacing};
use crate::types::{HarvestReport, LoopReport, PassReport, Post};
use anyhow::{anyhow, Result};
use tracing::info;

/// Everything a harvesting run needs, compiled and validated.
#[derive(Debug, Clone)]
pub struct Harvester {
    pub rules: CompiledRules,
    pub affordances: AffordanceSet,
    pub scroll: ScrollPolicy,
    pub see_more_pacing: TriggerPacing,
    pub pacing: TriggerPacing,
    pub max_load_more_rounds: Option<usize>,
}

impl Harvester {
    pub fn from_config(config: &ScoutConfig) -> Result<Self, RulesError> {
        Ok(Self {
            rules: config.rules.compile()?,
            affordances: config.affordances.compile()?,
            scroll: config.scroll.resolve(),
            see_more_pacing: config.pacing.resolve_see_more(),
            pacing: config.pacing.resolve(),
            max_load_more_rounds: config.pacing.max_load_more_rounds,
        })
    }

    /// Trigger every content-revealing affordance: "see more" toggles and
    /// comment toggles once each, then "load more comments" to a fixed point.
    pub async fn expand_all<S: LiveSurface>(
        &self,
        surface: &S,
    ) -> (PassReport, PassReport, LoopReport) {
        info!("Clicking all 'see more' buttons...");
        let see_more =
            trigger_once(surface, &self.affordances.see_more, &self.see_more_pacing).await;

        info!("Clicking all comment buttons...");
        let comment_toggles =
            trigger_once(surface, &self.affordances.comment_toggle, &self.pacing).await;

        info!("Clicking all 'load more comments'...");
        let load_more = trigger_until_exhausted(
            surface,
            &self.affordances.load_more_comments,
            &self.pacing,
            self.max_load_more_rounds,
        )
        .await;

        (see_more, comment_toggles, load_more)
    }

    /// Snapshot the live page and assemble its posts.
    pub async fn extract<S: LiveSurface>(&self, surface: &S) -> Result<Vec<Post>> {
        let markup = surface
            .snapshot()
            .await
            .map_err(|e| anyhow!("failed to snapshot feed for extraction: {}", e))?;
        Ok(assemble_posts(&markup, &self.rules))
    }

    /// Run the whole pipeline against a surface already positioned on the feed.
    pub async fn run<S: LiveSurface>(&self, surface: &S) -> Result<HarvestReport> {
        let scroll = scroll_feed(surface, &self.scroll).await;
        let (see_more, comment_toggles, load_more) = self.expand_all(surface).await;

        info!("Extracting posts...");
        let posts = self.extract(surface).await?;

        let revealed: usize = posts.iter().map(|p| p.comments.len()).sum();
        info!(
            "harvest: {} posts, {} comments revealed",
            posts.len(),
            revealed
        );

        Ok(HarvestReport {
            posts,
            scroll,
            see_more,
            comment_toggles,
            load_more,
        })
    }
}
