//! JSON artifact writers.
//!
//! Both artifacts are pretty-printed arrays (two-space indent) written as
//! UTF-8 with non-ASCII characters kept literally. Each write replaces the
//! file wholesale.

use crate::models::{ExtractedPost, Summary};
use serde::Serialize;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write every post scraped this run to `path`.
#[instrument(level = "info", skip_all, fields(%path, count = posts.len()))]
pub async fn write_posts(posts: &[ExtractedPost], path: &str) -> Result<(), Box<dyn Error>> {
    write_pretty(posts, path).await
}

/// Write today's summaries to `path`, replacing any earlier snapshot.
#[instrument(level = "info", skip_all, fields(%path, count = summaries.len()))]
pub async fn write_summaries(summaries: &[Summary], path: &str) -> Result<(), Box<dyn Error>> {
    write_pretty(summaries, path).await
}

async fn write_pretty<T: Serialize>(items: &[T], path: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(items)?;
    if let Err(e) = fs::write(path, json).await {
        error!(%path, error = %e, "Failed writing JSON");
        return Err(e.into());
    }
    info!(%path, "Wrote JSON file");
    Ok(())
}
