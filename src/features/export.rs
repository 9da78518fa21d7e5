//! Writing harvested posts to disk.

use crate::types::Post;
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

/// `{dir}/{topic}_{YYYY-MM-DD}.json`
pub fn output_path(dir: &Path, topic: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}_{}.json", topic, date.format("%Y-%m-%d")))
}

/// Save `posts` as a pretty-printed JSON array, dated today (local time).
pub fn save_posts(dir: &Path, topic: &str, posts: &[Post]) -> Result<PathBuf> {
    let today = chrono::Local::now().date_naive();
    save_posts_dated(dir, topic, today, posts)
}

pub fn save_posts_dated(
    dir: &Path,
    topic: &str,
    date: NaiveDate,
    posts: &[Post],
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .map_err(|e| anyhow!("failed to create output dir {}: {}", dir.display(), e))?;

    let path = output_path(dir, topic, date);
    let json = serde_json::to_string_pretty(posts)?;
    std::fs::write(&path, json).map_err(|e| anyhow!("failed to write {}: {}", path.display(), e))?;

    info!("[Saved] {} ({} posts)", path.display(), posts.len());
    Ok(path)
}
