use anyhow::{anyhow, Result};
use async_trait::async_trait;
use feed_scout::assemble::assemble_posts;
use feed_scout::scraping::rules::{Activation, CompiledRules, ExtractionRules};
use feed_scout::scraping::surface::LiveSurface;
use feed_scout::scraping::wait::Settle;
use feed_scout::triggers::TriggerPacing;
use feed_scout::{Harvester, LoopTermination, ScoutConfig, ScrollTermination};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio_test::assert_ok;

const FEED: &str = r#"
<html><body><main><ul>
  <li class="artdeco-card mb2">
    <span class="update-components-actor__title">
      <span aria-hidden="true">Jane Doe</span>
      <span class="visually-hidden">View Jane Doe’s profile</span>
    </span>
    <span class="update-components-actor__sub-description">2d • Edited • 🌐</span>
    <span class="break-words tvm-parent-container"><span dir="ltr">Great news
      <a href="https://www.linkedin.com/search/results/all/?keywords=%23hiring&amp;origin=HASH_TAG_FROM_FEED">#hiring</a>
      today</span></span>
    <span class="social-details-social-counts__reactions-count">1,234</span>
    <ul><li class="social-details-social-counts__comments">
      <button><span aria-hidden="true">2 comments</span></button>
    </li></ul>
    <span class="comments-comment-item__main-content">
      <div class="update-components-text"><span dir="ltr"> </span></div>
    </span>
    <span class="comments-comment-item__main-content">
      <div class="update-components-text"><span dir="ltr">Nice!</span></div>
    </span>
  </li>
  <li class="artdeco-card mb2">
    <span class="update-components-actor__title"><span aria-hidden="true">Acme Corp</span></span>
    <button aria-label="5 reposts of Acme Corp’s post">5 reposts</button>
  </li>
</ul></main></body></html>"#;

fn default_rules() -> CompiledRules {
    ExtractionRules::default().compile().unwrap()
}

#[test]
fn test_feed_fragment_assembles_jane_doe_post() {
    let posts = assemble_posts(FEED, &default_rules());
    assert_eq!(posts.len(), 2);

    let jane = &posts[0];
    assert_eq!(jane.posted_by, "Jane Doe");
    assert_eq!(jane.posted, "2d");
    assert_eq!(jane.caption, "Great news today");
    assert_eq!(jane.hashtags, vec!["#hiring".to_string()]);
    assert_eq!(jane.reacts, 1234);
    assert_eq!(jane.comment_count, 2);
    let comments: Vec<&str> = jane.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(comments, vec!["Nice!"]);

    let acme = &posts[1];
    assert_eq!(acme.posted_by, "Acme Corp");
    assert_eq!(acme.reposts, 5);
    assert!(acme.caption.is_empty());
    assert!(acme.comments.is_empty());
}

#[test]
fn test_post_serializes_comments_as_plain_strings() {
    let posts = assemble_posts(FEED, &default_rules());
    let json = serde_json::to_value(&posts[0]).unwrap();
    assert_eq!(json["comments"], serde_json::json!(["Nice!"]));
    assert_eq!(json["hashtags"], serde_json::json!(["#hiring"]));
    assert_eq!(json["reposts"], serde_json::json!(0));
}

/// In-memory feed: affordance queries are answered from per-selector queues
/// and every scroll grows the page until the configured number of loads.
#[derive(Default)]
struct FakeFeed {
    queries: Mutex<HashMap<String, VecDeque<Vec<(u32, Option<&'static str>)>>>>,
    loads_left: Mutex<u32>,
    height: Mutex<u64>,
    clicks: Mutex<Vec<(u32, Activation)>>,
    markup: String,
}

impl FakeFeed {
    fn queue(self, selector: &str, rounds: Vec<Vec<(u32, Option<&'static str>)>>) -> Self {
        self.queries
            .lock()
            .unwrap()
            .insert(selector.to_string(), rounds.into());
        self
    }
}

#[async_trait]
impl LiveSurface for FakeFeed {
    type Handle = (u32, Option<&'static str>);

    async fn find_candidates(&self, selector: &str) -> Result<Vec<Self::Handle>> {
        Ok(self
            .queries
            .lock()
            .unwrap()
            .get_mut(selector)
            .and_then(|q| q.pop_front())
            .unwrap_or_default())
    }

    async fn label(&self, handle: &Self::Handle) -> Result<Option<String>> {
        Ok(handle.1.map(str::to_string))
    }

    async fn reveal(&self, _handle: &Self::Handle) -> Result<()> {
        Ok(())
    }

    async fn activate(&self, handle: &Self::Handle, activation: Activation) -> Result<()> {
        if handle.0 == 0 {
            return Err(anyhow!("element detached"));
        }
        self.clicks.lock().unwrap().push((handle.0, activation));
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        let mut left = self.loads_left.lock().unwrap();
        if *left > 0 {
            *left -= 1;
            *self.height.lock().unwrap() += 1000;
        }
        Ok(())
    }

    async fn document_height(&self) -> Result<u64> {
        Ok(*self.height.lock().unwrap())
    }

    async fn snapshot(&self) -> Result<String> {
        Ok(self.markup.clone())
    }
}

fn instant_harvester() -> Harvester {
    let mut harvester = assert_ok!(Harvester::from_config(&ScoutConfig::default()));
    let instant = TriggerPacing {
        reveal: Settle::fixed(0),
        after_activate: Settle::fixed(0),
    };
    harvester.scroll.settle = Settle::fixed(0);
    harvester.scroll.max_scrolls = 10;
    harvester.see_more_pacing = instant;
    harvester.pacing = instant;
    harvester
}

#[tokio::test]
async fn test_harvest_scrolls_expands_and_extracts() {
    let harvester = instant_harvester();
    let aff = harvester.affordances.clone();
    let feed = FakeFeed {
        loads_left: Mutex::new(2),
        height: Mutex::new(1000),
        markup: FEED.to_string(),
        ..Default::default()
    }
    .queue(&aff.see_more.selector, vec![vec![(1, None), (0, None)]])
    .queue(
        &aff.comment_toggle.selector,
        vec![vec![
            (2, Some("2 comments on Jane Doe’s post")),
            (3, Some("Comment")),
        ]],
    )
    .queue(
        &aff.load_more_comments.selector,
        vec![vec![(4, None)], vec![(5, None), (6, None)], vec![]],
    );

    let report = assert_ok!(harvester.run(&feed).await);

    assert_eq!(report.scroll.termination, ScrollTermination::Stabilized);
    assert_eq!(report.scroll.scroll_count, 2);
    assert_eq!(report.scroll.final_height, 3000);

    assert_eq!(report.see_more.activated, 1);
    assert_eq!(report.see_more.failed, 1);
    assert_eq!(report.comment_toggles.found, 1);
    assert_eq!(report.load_more.rounds, 2);
    assert_eq!(report.load_more.termination, LoopTermination::Exhausted);

    let clicks = feed.clicks.lock().unwrap().clone();
    assert_eq!(
        clicks,
        vec![
            (1, Activation::Script),
            (2, Activation::Pointer),
            (4, Activation::Pointer),
            (5, Activation::Pointer),
            (6, Activation::Pointer),
        ]
    );

    assert_eq!(report.posts.len(), 2);
    assert_eq!(report.posts[0].posted_by, "Jane Doe");
}

#[tokio::test]
async fn test_harvest_respects_load_more_round_limit() {
    let mut harvester = instant_harvester();
    harvester.max_load_more_rounds = Some(1);
    let selector = harvester.affordances.load_more_comments.selector.clone();
    let feed = FakeFeed::default().queue(&selector, vec![vec![(1, None)], vec![(2, None)]]);

    let report = assert_ok!(harvester.run(&feed).await);

    assert_eq!(report.load_more.rounds, 1);
    assert_eq!(report.load_more.termination, LoopTermination::RoundLimit);
    assert!(report.posts.is_empty());
}
