use serde::{Deserialize, Serialize};

/// One feed entry, snapshotted from the rendered tree.
///
/// Every field has a default so a post with missing substructure still
/// assembles; see [`crate::scraping::extract`] for the per-field rules.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Post {
    #[serde(default)]
    pub posted_by: String,
    /// Relative time as displayed, e.g. `"2d"`.
    #[serde(default)]
    pub posted: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub reacts: u64,
    #[serde(default)]
    pub reposts: u64,
    /// Platform-reported total. May exceed `comments.len()`.
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A revealed comment. Serializes as its bare text.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Comment {
    pub text: String,
}

impl Comment {
    /// Returns `None` for blank text; empty comments are never kept.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self { text })
        }
    }
}

// ---------------------------------------------------------------------------
// Interaction reports
// ---------------------------------------------------------------------------

/// Outcome of one bounded pass over an affordance.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub found: usize,
    pub activated: usize,
    pub failed: usize,
}

impl PassReport {
    pub fn absorb(&mut self, other: PassReport) {
        self.found += other.found;
        self.activated += other.activated;
        self.failed += other.failed;
    }
}

/// Why a fixed-point trigger loop stopped. All variants are clean exits.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoopTermination {
    /// A query round found no matching affordance.
    Exhausted,
    /// Candidates were found but none could be activated.
    NoProgress,
    /// The optional round ceiling was reached.
    RoundLimit,
    /// The live tree could not be queried.
    QueryFailed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct LoopReport {
    pub rounds: usize,
    pub totals: PassReport,
    pub termination: LoopTermination,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScrollTermination {
    /// Height stopped growing for the configured number of ticks.
    Stabilized,
    /// `scroll_count` reached the ceiling.
    Ceiling,
    /// Page height could not be read.
    Interrupted,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ScrollReport {
    pub ticks: u32,
    pub scroll_count: u32,
    pub final_height: u64,
    pub termination: ScrollTermination,
}

/// Everything one harvesting run produced.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HarvestReport {
    pub posts: Vec<Post>,
    pub scroll: ScrollReport,
    pub see_more: PassReport,
    pub comment_toggles: PassReport,
    pub load_more: LoopReport,
}
