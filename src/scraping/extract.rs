//! Field extractors.
//!
//! Each function reads one field of a post from the document tree and falls
//! back to the field's default (`""`, `0`, empty list) when the expected
//! substructure is missing. Nothing here returns an error.

use super::dom::{Node, TextJoin};
use super::rules::CompiledRules;
use crate::types::Comment;

/// Author display name, taken from the visible (non screen-reader) variant of
/// the actor title.
pub fn posted_by(post: &Node<'_>, rules: &CompiledRules) -> String {
    post.find(&rules.actor_title)
        .and_then(|title| title.find(&rules.actor_title_visible))
        .map(|visible| visible.text(TextJoin::Trimmed))
        .unwrap_or_default()
}

/// Relative post time: the sub-description up to the first separator glyph.
pub fn posted_time(post: &Node<'_>, rules: &CompiledRules) -> String {
    let Some(container) = post.find(&rules.actor_sub_description) else {
        return String::new();
    };
    let text = container.text(TextJoin::Trimmed);
    let sep = rules.posted_separator.as_str();
    if !sep.is_empty() {
        if let Some((head, _)) = text.split_once(sep) {
            return head.trim().to_string();
        }
    }
    text
}

/// Caption text with hashtag and mention links removed.
///
/// Works on an isolated copy of the container so the original stays intact for
/// [`hashtags`].
pub fn caption(container: Option<&Node<'_>>, rules: &CompiledRules) -> String {
    let Some(container) = container else {
        return String::new();
    };
    let mut copy = container.isolate();
    copy.remove_all(&rules.caption_strip);
    copy.root().text(TextJoin::Separated(" "))
}

/// Hashtags linked from the caption, in document order, duplicates kept.
pub fn hashtags(container: Option<&Node<'_>>, rules: &CompiledRules) -> Vec<String> {
    let Some(container) = container else {
        return Vec::new();
    };
    container
        .find_where(&rules.hashtag_anchor, |a| {
            a.attr("href")
                .is_some_and(|href| rules.hashtag_href.is_match(href))
        })
        .iter()
        .filter_map(|a| {
            let text = a.text(TextJoin::Trimmed);
            rules
                .hashtag_token
                .find(&text)
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

pub fn reaction_count(post: &Node<'_>, rules: &CompiledRules) -> u64 {
    post.find(&rules.reactions_count)
        .and_then(|span| parse_count(&span.text(TextJoin::Trimmed)))
        .unwrap_or(0)
}

/// First `"<N> repost(s)"` count found on a button label.
pub fn repost_count(post: &Node<'_>, rules: &CompiledRules) -> u64 {
    post.find_all(&rules.repost_button)
        .iter()
        .filter_map(|btn| btn.attr("aria-label"))
        .filter_map(|label| rules.repost_label.captures(label))
        .find_map(|caps| caps.get(1).and_then(|m| parse_count(m.as_str())))
        .unwrap_or(0)
}

/// Declared comment total, e.g. `"12 comments"` → 12. The leading token must
/// be a plain digit run; `"1,234 comments"` yields 0.
pub fn comment_count(post: &Node<'_>, rules: &CompiledRules) -> u64 {
    post.find(&rules.comment_counts_item)
        .and_then(|item| item.find(&rules.comment_counts_visible))
        .and_then(|span| {
            let text = span.text(TextJoin::Trimmed);
            text.split_whitespace()
                .next()
                .filter(|tok| tok.chars().all(|c| c.is_ascii_digit()))
                .and_then(|tok| tok.parse().ok())
        })
        .unwrap_or(0)
}

/// Revealed comments with non-empty text.
pub fn comments(post: &Node<'_>, rules: &CompiledRules) -> Vec<Comment> {
    post.find_all(&rules.comment_item)
        .iter()
        .filter_map(|item| item.find(&rules.comment_text))
        .filter_map(|body| Comment::new(body.text(TextJoin::Trimmed)))
        .collect()
}

/// Parse a displayed count such as `"1,234"`. Thousands separators are
/// dropped; anything else that is not a plain digit run yields `None`.
pub fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text.trim().chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraping::dom::Document;
    use crate::scraping::rules::ExtractionRules;

    fn rules() -> CompiledRules {
        ExtractionRules::default().compile().unwrap()
    }

    fn with_post<R>(inner: &str, f: impl FnOnce(&Node<'_>) -> R) -> R {
        let doc = Document::parse_fragment(&format!(
            r#"<ul><li class="artdeco-card mb2">{inner}</li></ul>"#
        ));
        let rules = rules();
        let post = doc.root().find(&rules.post_container).expect("post container");
        f(&post)
    }

    #[test]
    fn test_posted_by_prefers_visible_variant() {
        let html = r#"<span class="update-components-actor__title">
              <span dir="ltr"><span aria-hidden="true"><!---->Jane Doe<!----></span>
              <span class="visually-hidden">View Jane Doe’s profile</span></span></span>"#;
        assert_eq!(with_post(html, |p| posted_by(p, &rules())), "Jane Doe");
    }

    #[test]
    fn test_posted_by_without_visible_variant_is_empty() {
        let html = r#"<span class="update-components-actor__title">
              <span class="visually-hidden">Jane Doe</span></span>"#;
        assert_eq!(with_post(html, |p| posted_by(p, &rules())), "");
        assert_eq!(with_post("<p>no actor</p>", |p| posted_by(p, &rules())), "");
    }

    #[test]
    fn test_posted_time_keeps_segment_before_separator() {
        let html = r#"<span class="update-components-actor__sub-description">
              <span aria-hidden="true">2d • Edited • </span></span>"#;
        assert_eq!(with_post(html, |p| posted_time(p, &rules())), "2d");

        let plain = r#"<span class="update-components-actor__sub-description"> 5h </span>"#;
        assert_eq!(with_post(plain, |p| posted_time(p, &rules())), "5h");

        assert_eq!(with_post("<p></p>", |p| posted_time(p, &rules())), "");
    }

    #[test]
    fn test_caption_without_anchors() {
        let html = r#"<span class="break-words tvm-parent-container">
              <span dir="ltr">  Shipping   the new
              release <br> today </span></span>"#;
        with_post(html, |p| {
            let r = rules();
            let container = p.find(&r.caption_container);
            assert!(hashtags(container.as_ref(), &r).is_empty());
            assert_eq!(
                caption(container.as_ref(), &r),
                container.unwrap().text(TextJoin::Separated(" "))
            );
        });
    }

    #[test]
    fn test_caption_strips_links_and_hashtags_keep_order() {
        let html = r#"<span class="break-words tvm-parent-container"><span dir="ltr">
              We are <a href="https://www.linkedin.com/search/results/all/?keywords=%23hiring&origin=HASH_TAG">hashtag#hiring</a>
              with <a href="https://www.linkedin.com/in/acme">Acme</a>
              <a href="https://www.linkedin.com/search/results/all/?keywords=%23rust">#rust</a>
              <a href="https://www.linkedin.com/search/results/all/?keywords=%23hiring">#hiring</a>
              <a href="https://www.linkedin.com/search/results/all/?keywords=%23empty">no tag</a>
            </span></span>"#;
        with_post(html, |p| {
            let r = rules();
            let container = p.find(&r.caption_container);
            let text = caption(container.as_ref(), &r);
            let tags = hashtags(container.as_ref(), &r);

            assert_eq!(text, "We are with");
            assert_eq!(tags, vec!["#hiring", "#rust", "#hiring"]);
            for tag in &tags {
                assert!(!text.contains(tag.as_str()));
            }
        });
    }

    #[test]
    fn test_caption_is_idempotent_on_its_own_copy() {
        let html = r#"<span class="break-words tvm-parent-container">
              Great news <a href="/search/results/all/?keywords=%23hiring">#hiring</a> today</span>"#;
        with_post(html, |p| {
            let r = rules();
            let container = p.find(&r.caption_container);
            let first = caption(container.as_ref(), &r);

            let copy = container.unwrap().isolate();
            let reparsed = copy.root().find(&r.caption_container);
            assert_eq!(caption(reparsed.as_ref(), &r), first);
            assert_eq!(first, "Great news today");
        });
    }

    #[test]
    fn test_missing_caption_container_defaults() {
        let r = rules();
        assert_eq!(caption(None, &r), "");
        assert!(hashtags(None, &r).is_empty());
    }

    #[test]
    fn test_reaction_count_parsing() {
        let ok = r#"<span class="social-details-social-counts__reactions-count">1,234</span>"#;
        assert_eq!(with_post(ok, |p| reaction_count(p, &rules())), 1234);

        let bad = r#"<span class="social-details-social-counts__reactions-count">1.2K</span>"#;
        assert_eq!(with_post(bad, |p| reaction_count(p, &rules())), 0);

        assert_eq!(with_post("<p></p>", |p| reaction_count(p, &rules())), 0);
    }

    #[test]
    fn test_repost_count_takes_first_label_match() {
        let html = r#"
            <button aria-label="Like">Like</button>
            <button aria-label="3 reposts of Jane Doe’s post">3 reposts</button>
            <button aria-label="1 repost">1 repost</button>"#;
        assert_eq!(with_post(html, |p| repost_count(p, &rules())), 3);

        let grouped = r#"<button aria-label="1,020 reposts">x</button>"#;
        assert_eq!(with_post(grouped, |p| repost_count(p, &rules())), 1020);

        let none = r#"<button aria-label="Repost">Repost</button>"#;
        assert_eq!(with_post(none, |p| repost_count(p, &rules())), 0);
    }

    #[test]
    fn test_comment_count_uses_visible_span() {
        let html = r#"<ul><li class="social-details-social-counts__comments">
              <button><span aria-hidden="true">12 comments</span>
              <span class="visually-hidden">12 comments on Jane Doe’s post</span></button>
            </li></ul>"#;
        assert_eq!(with_post(html, |p| comment_count(p, &rules())), 12);

        let malformed = r#"<ul><li class="social-details-social-counts__comments">
              <span aria-hidden="true">comments</span></li></ul>"#;
        assert_eq!(with_post(malformed, |p| comment_count(p, &rules())), 0);
    }

    #[test]
    fn test_comment_count_requires_plain_digit_token() {
        let grouped = r#"<ul><li class="social-details-social-counts__comments">
              <span aria-hidden="true">1,234 comments</span></li></ul>"#;
        assert_eq!(with_post(grouped, |p| comment_count(p, &rules())), 0);

        let plain = r#"<ul><li class="social-details-social-counts__comments">
              <span aria-hidden="true">1234 comments</span></li></ul>"#;
        assert_eq!(with_post(plain, |p| comment_count(p, &rules())), 1234);
    }

    #[test]
    fn test_missing_comment_count_is_zero_even_with_comments() {
        let html = r#"
            <span class="comments-comment-item__main-content">
              <div class="update-components-text">First!</div></span>"#;
        with_post(html, |p| {
            let r = rules();
            assert_eq!(comment_count(p, &r), 0);
            assert_eq!(comments(p, &r).len(), 1);
        });
    }

    #[test]
    fn test_comments_drop_empty_and_keep_order() {
        let html = r#"
            <span class="comments-comment-item__main-content">
              <div class="update-components-text"><span dir="ltr">  </span></div></span>
            <span class="comments-comment-item__main-content">
              <div class="update-components-text"><span dir="ltr">Congrats <a href="/in/x">Sam</a>!</span></div></span>
            <span class="comments-comment-item__main-content"><p>no text node</p></span>
            <span class="comments-comment-item__main-content">
              <div class="update-components-text">Second</div></span>"#;
        let texts: Vec<String> = with_post(html, |p| comments(p, &rules()))
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, vec!["Congrats Sam!", "Second"]);
    }

    #[test]
    fn test_parse_count_rejects_malformed_text() {
        assert_eq!(parse_count("42"), Some(42));
        assert_eq!(parse_count(" 1,234 "), Some(1234));
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("-3"), None);
        assert_eq!(parse_count("12k"), None);
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count("99999999999999999999999"), None);
    }
}
