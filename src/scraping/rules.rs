//! Selector and label-grammar configuration.
//!
//! The markup contract of the target site lives here as data. Defaults match
//! the current LinkedIn feed card; every value can be overridden from
//! `feed-scout.json` and is validated once by [`ExtractionRules::compile`] /
//! [`AffordanceRules::compile`].

use crate::core::error::RulesError;
use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

/// Selectors and patterns used by the field extractors.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractionRules {
    /// Top-level feed card.
    pub post_container: String,
    pub caption_container: String,
    /// Elements removed from the caption copy before its text is read.
    pub caption_strip: String,
    pub actor_title: String,
    /// Sighted-user variant inside the actor title (skips screen-reader duplicates).
    pub actor_title_visible: String,
    pub actor_sub_description: String,
    /// Glyph separating the relative time from the rest of the sub-description.
    pub posted_separator: String,
    pub hashtag_anchor: String,
    pub hashtag_href_pattern: String,
    pub hashtag_token_pattern: String,
    pub reactions_count: String,
    pub repost_button: String,
    /// Must capture the count in group 1.
    pub repost_label_pattern: String,
    pub comment_counts_item: String,
    pub comment_counts_visible: String,
    pub comment_item: String,
    pub comment_text: String,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            post_container: "li.artdeco-card.mb2".into(),
            caption_container: "span.break-words.tvm-parent-container".into(),
            caption_strip: "a".into(),
            actor_title: "span.update-components-actor__title".into(),
            actor_title_visible: r#"span[aria-hidden="true"]"#.into(),
            actor_sub_description: "span.update-components-actor__sub-description".into(),
            posted_separator: "•".into(),
            hashtag_anchor: "a[href]".into(),
            hashtag_href_pattern: r"/search/results/all/\?keywords=%23".into(),
            hashtag_token_pattern: r"#\w+".into(),
            reactions_count: "span.social-details-social-counts__reactions-count".into(),
            repost_button: "button[aria-label]".into(),
            repost_label_pattern: r"(\d[\d,]*)\s+reposts?".into(),
            comment_counts_item: "li.social-details-social-counts__comments".into(),
            comment_counts_visible: r#"span[aria-hidden="true"]"#.into(),
            comment_item: "span.comments-comment-item__main-content".into(),
            comment_text: "div.update-components-text".into(),
        }
    }
}

/// Validated form of [`ExtractionRules`].
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub post_container: Selector,
    pub caption_container: Selector,
    pub caption_strip: Selector,
    pub actor_title: Selector,
    pub actor_title_visible: Selector,
    pub actor_sub_description: Selector,
    pub posted_separator: String,
    pub hashtag_anchor: Selector,
    pub hashtag_href: Regex,
    pub hashtag_token: Regex,
    pub reactions_count: Selector,
    pub repost_button: Selector,
    pub repost_label: Regex,
    pub comment_counts_item: Selector,
    pub comment_counts_visible: Selector,
    pub comment_item: Selector,
    pub comment_text: Selector,
}

impl ExtractionRules {
    pub fn compile(&self) -> Result<CompiledRules, RulesError> {
        Ok(CompiledRules {
            post_container: selector("post_container", &self.post_container)?,
            caption_container: selector("caption_container", &self.caption_container)?,
            caption_strip: selector("caption_strip", &self.caption_strip)?,
            actor_title: selector("actor_title", &self.actor_title)?,
            actor_title_visible: selector("actor_title_visible", &self.actor_title_visible)?,
            actor_sub_description: selector(
                "actor_sub_description",
                &self.actor_sub_description,
            )?,
            posted_separator: self.posted_separator.clone(),
            hashtag_anchor: selector("hashtag_anchor", &self.hashtag_anchor)?,
            hashtag_href: pattern("hashtag_href_pattern", &self.hashtag_href_pattern)?,
            hashtag_token: pattern("hashtag_token_pattern", &self.hashtag_token_pattern)?,
            reactions_count: selector("reactions_count", &self.reactions_count)?,
            repost_button: selector("repost_button", &self.repost_button)?,
            repost_label: pattern("repost_label_pattern", &self.repost_label_pattern)?,
            comment_counts_item: selector("comment_counts_item", &self.comment_counts_item)?,
            comment_counts_visible: selector(
                "comment_counts_visible",
                &self.comment_counts_visible,
            )?,
            comment_item: selector("comment_item", &self.comment_item)?,
            comment_text: selector("comment_text", &self.comment_text)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Affordances (live tree)
// ---------------------------------------------------------------------------

/// How an affordance is activated in the browser.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Native pointer click at the element's center.
    #[default]
    Pointer,
    /// `element.click()` from script; works for elements under overlays.
    Script,
}

/// One clickable affordance: a CSS candidate query plus an optional
/// accessible-label grammar the candidate's `aria-label` must match.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AffordanceRule {
    pub selector: String,
    #[serde(default)]
    pub label_pattern: Option<String>,
    #[serde(default)]
    pub activation: Activation,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AffordanceRules {
    pub see_more: AffordanceRule,
    pub comment_toggle: AffordanceRule,
    pub load_more_comments: AffordanceRule,
}

impl Default for AffordanceRules {
    fn default() -> Self {
        Self {
            see_more: AffordanceRule {
                selector: ".feed-shared-inline-show-more-text__see-more-less-toggle".into(),
                label_pattern: None,
                activation: Activation::Script,
            },
            comment_toggle: AffordanceRule {
                selector: r#"button[aria-label*="comment"]"#.into(),
                label_pattern: Some(r"^\d+\s+comments?\s+on\s+.+?(?:’s)?\s+post$".into()),
                activation: Activation::Pointer,
            },
            load_more_comments: AffordanceRule {
                selector: r#"button[aria-label="Load more comments"]"#.into(),
                label_pattern: None,
                activation: Activation::Pointer,
            },
        }
    }
}

/// Validated affordance, ready for [`crate::tools::triggers`].
#[derive(Debug, Clone)]
pub struct Affordance {
    pub name: &'static str,
    /// Passed verbatim to the browser's `querySelectorAll`.
    pub selector: String,
    pub label: Option<Regex>,
    pub activation: Activation,
}

impl Affordance {
    /// A candidate qualifies when there is no label grammar, or its label matches it.
    pub fn accepts_label(&self, label: Option<&str>) -> bool {
        match (&self.label, label) {
            (None, _) => true,
            (Some(re), Some(l)) => re.is_match(l.trim()),
            (Some(_), None) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AffordanceSet {
    pub see_more: Affordance,
    pub comment_toggle: Affordance,
    pub load_more_comments: Affordance,
}

impl AffordanceRule {
    pub fn compile(&self, name: &'static str) -> Result<Affordance, RulesError> {
        selector(name, &self.selector)?;
        let label = self
            .label_pattern
            .as_deref()
            .map(|p| pattern(name, p))
            .transpose()?;
        Ok(Affordance {
            name,
            selector: self.selector.clone(),
            label,
            activation: self.activation,
        })
    }
}

impl AffordanceRules {
    pub fn compile(&self) -> Result<AffordanceSet, RulesError> {
        Ok(AffordanceSet {
            see_more: self.see_more.compile("see_more")?,
            comment_toggle: self.comment_toggle.compile("comment_toggle")?,
            load_more_comments: self.load_more_comments.compile("load_more_comments")?,
        })
    }
}

fn selector(field: &'static str, css: &str) -> Result<Selector, RulesError> {
    Selector::parse(css).map_err(|e| RulesError::Selector {
        field,
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

fn pattern(field: &'static str, re: &str) -> Result<Regex, RulesError> {
    Regex::new(re).map_err(|source| RulesError::Pattern { field, source })
}
