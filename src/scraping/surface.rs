//! The live, interaction-mutable page.
//!
//! The trigger engine and the scroll driver only talk to [`LiveSurface`];
//! [`CdpSurface`] is the Chromium implementation.

use super::rules::Activation;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use tracing::warn;

#[async_trait]
pub trait LiveSurface: Send + Sync {
    type Handle: Send + Sync;

    /// All elements currently matching a CSS selector.
    async fn find_candidates(&self, selector: &str) -> Result<Vec<Self::Handle>>;

    /// The element's accessible label (`aria-label`), if any.
    async fn label(&self, handle: &Self::Handle) -> Result<Option<String>>;

    /// Scroll the element to the viewport center.
    async fn reveal(&self, handle: &Self::Handle) -> Result<()>;

    async fn activate(&self, handle: &Self::Handle, activation: Activation) -> Result<()>;

    async fn scroll_to_bottom(&self) -> Result<()>;

    async fn document_height(&self) -> Result<u64>;

    /// Current rendered markup.
    async fn snapshot(&self) -> Result<String>;
}

/// [`LiveSurface`] over a chromiumoxide tab.
#[derive(Clone)]
pub struct CdpSurface {
    page: Page,
}

impl CdpSurface {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl LiveSurface for CdpSurface {
    type Handle = Element;

    async fn find_candidates(&self, selector: &str) -> Result<Vec<Element>> {
        self.page
            .find_elements(selector)
            .await
            .map_err(|e| anyhow!("query '{}' failed: {}", selector, e))
    }

    async fn label(&self, handle: &Element) -> Result<Option<String>> {
        handle
            .attribute("aria-label")
            .await
            .map_err(|e| anyhow!("failed to read aria-label: {}", e))
    }

    async fn reveal(&self, handle: &Element) -> Result<()> {
        handle
            .call_js_fn(
                "function() { this.scrollIntoView({block: 'center'}); }",
                false,
            )
            .await
            .map_err(|e| anyhow!("scrollIntoView failed: {}", e))?;
        Ok(())
    }

    async fn activate(&self, handle: &Element, activation: Activation) -> Result<()> {
        match activation {
            Activation::Pointer => {
                handle
                    .click()
                    .await
                    .map_err(|e| anyhow!("click failed: {}", e))?;
            }
            Activation::Script => {
                handle
                    .call_js_fn("function() { this.click(); }", false)
                    .await
                    .map_err(|e| anyhow!("script click failed: {}", e))?;
            }
        }
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight);")
            .await
            .map_err(|e| anyhow!("scroll to bottom failed: {}", e))?;
        Ok(())
    }

    async fn document_height(&self) -> Result<u64> {
        let height = self
            .page
            .evaluate("document.body.scrollHeight")
            .await
            .map_err(|e| anyhow!("failed to read document height: {}", e))?
            .into_value::<u64>()
            .map_err(|e| anyhow!("document height is not a number: {}", e))?;
        Ok(height)
    }

    async fn snapshot(&self) -> Result<String> {
        match self.page.content().await {
            Ok(html) if !html.is_empty() => return Ok(html),
            Ok(_) => warn!("page.content returned empty markup; retrying via outerHTML"),
            Err(e) => warn!("page.content failed: {}; retrying via outerHTML", e),
        }

        let html = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| anyhow!("failed to snapshot page: {}", e))?
            .into_value::<String>()
            .map_err(|e| anyhow!("snapshot is not a string: {}", e))?;
        Ok(html)
    }
}

/// Scripted surface for exercising interaction loops without a browser.
#[cfg(test)]
pub(crate) mod scripted {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    #[derive(Clone, Debug)]
    pub struct FakeHandle {
        pub id: usize,
        pub label: Option<String>,
        pub fails: bool,
    }

    impl FakeHandle {
        pub fn ok(id: usize) -> Self {
            Self { id, label: None, fails: false }
        }

        pub fn failing(id: usize) -> Self {
            Self { id, label: None, fails: true }
        }

        pub fn labelled(id: usize, label: &str) -> Self {
            Self { id, label: Some(label.to_string()), fails: false }
        }
    }

    #[derive(Default)]
    pub struct ScriptedSurface {
        /// Query results per selector, served in order; empty once drained.
        pub rounds: Mutex<HashMap<String, VecDeque<Vec<FakeHandle>>>>,
        /// Heights served in order; the last one repeats.
        pub heights: Mutex<VecDeque<u64>>,
        pub height_reads: Mutex<usize>,
        pub scrolls: Mutex<usize>,
        pub revealed: Mutex<Vec<usize>>,
        pub activated: Mutex<Vec<(usize, Activation)>>,
        pub markup: String,
        pub fail_queries: bool,
    }

    impl ScriptedSurface {
        pub fn with_rounds(mut self, selector: &str, rounds: Vec<Vec<FakeHandle>>) -> Self {
            self.rounds
                .get_mut()
                .unwrap()
                .insert(selector.to_string(), rounds.into());
            self
        }

        pub fn with_heights(mut self, heights: &[u64]) -> Self {
            *self.heights.get_mut().unwrap() = heights.iter().copied().collect();
            self
        }

        pub fn with_markup(mut self, markup: &str) -> Self {
            self.markup = markup.to_string();
            self
        }

        pub fn activated_ids(&self) -> Vec<usize> {
            self.activated.lock().unwrap().iter().map(|(id, _)| *id).collect()
        }
    }

    #[async_trait]
    impl LiveSurface for ScriptedSurface {
        type Handle = FakeHandle;

        async fn find_candidates(&self, selector: &str) -> Result<Vec<FakeHandle>> {
            if self.fail_queries {
                return Err(anyhow!("target closed"));
            }
            let mut rounds = self.rounds.lock().unwrap();
            Ok(rounds
                .get_mut(selector)
                .and_then(|queue| queue.pop_front())
                .unwrap_or_default())
        }

        async fn label(&self, handle: &FakeHandle) -> Result<Option<String>> {
            Ok(handle.label.clone())
        }

        async fn reveal(&self, handle: &FakeHandle) -> Result<()> {
            self.revealed.lock().unwrap().push(handle.id);
            Ok(())
        }

        async fn activate(&self, handle: &FakeHandle, activation: Activation) -> Result<()> {
            if handle.fails {
                return Err(anyhow!("element {} is not clickable", handle.id));
            }
            self.activated.lock().unwrap().push((handle.id, activation));
            Ok(())
        }

        async fn scroll_to_bottom(&self) -> Result<()> {
            *self.scrolls.lock().unwrap() += 1;
            Ok(())
        }

        async fn document_height(&self) -> Result<u64> {
            *self.height_reads.lock().unwrap() += 1;
            let mut heights = self.heights.lock().unwrap();
            let height = if heights.len() > 1 {
                heights.pop_front()
            } else {
                heights.front().copied()
            };
            height.ok_or_else(|| anyhow!("no height scripted"))
        }

        async fn snapshot(&self) -> Result<String> {
            Ok(self.markup.clone())
        }
    }
}
