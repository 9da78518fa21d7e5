//! Queryable document tree over rendered markup.
//!
//! Everything the extractors know about a page goes through [`Node`]:
//! descendant search, attribute reads and text joining. Mutation is only
//! possible on an owned [`Document`], which is how caption sanitizing works on
//! an isolated copy without touching the snapshot other extractors read.

use scraper::{ElementRef, Html, Selector};

/// How text nodes below an element are combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextJoin<'s> {
    /// Concatenate text nodes verbatim, then trim both ends.
    Trimmed,
    /// Trim each text node, drop empty ones, join the rest with the separator.
    Separated(&'s str),
}

/// An owned, parsed tree (whole page or a fragment).
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    pub fn parse_fragment(markup: &str) -> Self {
        Self {
            html: Html::parse_fragment(markup),
        }
    }

    pub fn root(&self) -> Node<'_> {
        Node {
            el: self.html.root_element(),
        }
    }

    /// Detach every element matching `selector` (and its subtree).
    /// Returns how many matches were removed.
    pub fn remove_all(&mut self, selector: &Selector) -> usize {
        let ids: Vec<_> = self.html.select(selector).map(|el| el.id()).collect();
        for id in &ids {
            if let Some(mut node) = self.html.tree.get_mut(*id) {
                node.detach();
            }
        }
        ids.len()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.html.root_element().value().name())
            .finish()
    }
}

/// A borrowed element inside a [`Document`].
#[derive(Clone, Copy, Debug)]
pub struct Node<'a> {
    el: ElementRef<'a>,
}

impl<'a> Node<'a> {
    /// First descendant matching `selector`, in document order.
    pub fn find(&self, selector: &Selector) -> Option<Node<'a>> {
        self.el.select(selector).next().map(|el| Node { el })
    }

    pub fn find_all(&self, selector: &Selector) -> Vec<Node<'a>> {
        self.el.select(selector).map(|el| Node { el }).collect()
    }

    /// Descendants matching `selector` that also satisfy `predicate`.
    pub fn find_where<P>(&self, selector: &Selector, predicate: P) -> Vec<Node<'a>>
    where
        P: Fn(&Node<'a>) -> bool,
    {
        self.el
            .select(selector)
            .map(|el| Node { el })
            .filter(|n| predicate(n))
            .collect()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.el.value().attr(name)
    }

    pub fn tag(&self) -> &'a str {
        self.el.value().name()
    }

    pub fn text(&self, join: TextJoin<'_>) -> String {
        match join {
            TextJoin::Trimmed => self.el.text().collect::<String>().trim().to_string(),
            TextJoin::Separated(sep) => self
                .el
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(sep),
        }
    }

    /// Re-parse this subtree into an independent document.
    pub fn isolate(&self) -> Document {
        Document::parse_fragment(&self.el.html())
    }
}
