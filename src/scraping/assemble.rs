use super::dom::{Document, Node};
use super::extract;
use super::rules::CompiledRules;
use crate::types::Post;
use tracing::{debug, info};

/// Parse a page snapshot and assemble every feed card into a [`Post`].
pub fn assemble_posts(markup: &str, rules: &CompiledRules) -> Vec<Post> {
    let document = Document::parse(markup);
    let posts = assemble_from(&document, rules);
    info!("assembled {} posts from snapshot ({} bytes)", posts.len(), markup.len());
    posts
}

/// Assemble all post containers found under the document root.
pub fn assemble_from(document: &Document, rules: &CompiledRules) -> Vec<Post> {
    document
        .root()
        .find_all(&rules.post_container)
        .iter()
        .map(|container| assemble_post(container, rules))
        .collect()
}

/// Compose all field extractors over one post container.
pub fn assemble_post(post: &Node<'_>, rules: &CompiledRules) -> Post {
    let caption_container = post.find(&rules.caption_container);

    let assembled = Post {
        posted_by: extract::posted_by(post, rules),
        posted: extract::posted_time(post, rules),
        caption: extract::caption(caption_container.as_ref(), rules),
        hashtags: extract::hashtags(caption_container.as_ref(), rules),
        reacts: extract::reaction_count(post, rules),
        reposts: extract::repost_count(post, rules),
        comment_count: extract::comment_count(post, rules),
        comments: extract::comments(post, rules),
    };

    if assembled.comment_count as usize != assembled.comments.len() {
        debug!(
            "post by '{}': {} comments declared, {} revealed",
            assembled.posted_by,
            assembled.comment_count,
            assembled.comments.len()
        );
    }

    assembled
}
