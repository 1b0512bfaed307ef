//! Batch orchestrator.
//!
//! One run is strictly sequential:
//!
//! 1. ensure the `posts` table exists
//! 2. read the feed and keep entries inside the lookback window
//! 3. for each entry: scrape, store, keep in memory
//! 4. write the full-run artifact and print a preview of the first post
//! 5. load today's stored posts, summarize them and write the summaries
//!    artifact, or print that there is nothing for today
//!
//! An empty window ends the run after step 2 without writing anything.

use crate::config::DigestConfig;
use crate::feed;
use crate::models::{ExtractedPost, StoredPost};
use crate::outputs::{console, json};
use crate::scrapers::PostScraper;
use crate::store::PostStore;
use crate::summarize::build_summaries;
use crate::utils::{ensure_writable_parent, truncate_for_log};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Counts describing what a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Feed entries inside the lookback window.
    pub entries: usize,
    /// Entries that produced a new row in the store.
    pub newly_stored: usize,
    /// Stored posts dated today.
    pub todays_posts: usize,
}

/// Run the batch against the current UTC clock.
pub async fn run(config: &DigestConfig) -> Result<RunOutcome, Box<dyn Error>> {
    run_at(config, Utc::now()).await
}

/// Run the batch as if the current time were `now`.
#[instrument(level = "info", skip_all, fields(feed_url = %config.feed_url, %now))]
pub async fn run_at(config: &DigestConfig, now: DateTime<Utc>) -> Result<RunOutcome, Box<dyn Error>> {
    let t0 = Instant::now();
    let store = PostStore::new(&config.store_path);
    let scraper = PostScraper::new(config)?;

    store.ensure_schema().await?;

    let feed_client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()?;
    let entries = feed::fetch_recent_entries(
        &feed_client,
        &config.feed_url,
        now,
        config.lookback_days,
        config.skip_malformed_dates,
    )
    .await?;

    let mut outcome = RunOutcome {
        entries: entries.len(),
        ..RunOutcome::default()
    };

    if entries.is_empty() {
        println!("{}", console::no_recent_posts(config.lookback_days));
        info!(elapsed_secs = t0.elapsed().as_secs(), "Nothing to scrape");
        return Ok(outcome);
    }

    ensure_writable_parent(&config.output_path).await?;
    ensure_writable_parent(&config.summary_path).await?;

    // One entry at a time: the pre-request delay is per fetch, not per batch.
    let scraped: Vec<(ExtractedPost, bool)> = stream::iter(entries.iter().enumerate())
        .then(|(index, entry)| {
            let scraper = &scraper;
            let store = &store;
            async move {
                debug!(index, url = %entry.url, feed_author = %entry.author, "Processing entry");
                let details = scraper.scrape(&entry.url, &entry.description).await;
                let post = ExtractedPost::from_entry(entry, details);
                debug!(index, content = %truncate_for_log(&post.content, 120), "Scraped content");
                let stored = store.insert_if_new(&StoredPost::from(&post)).await;
                (post, stored)
            }
        })
        .collect()
        .await;

    outcome.newly_stored = scraped.iter().filter(|(_, stored)| *stored).count();
    let posts: Vec<ExtractedPost> = scraped.into_iter().map(|(post, _)| post).collect();

    json::write_posts(&posts, &config.output_path).await?;
    println!(
        "{}",
        console::first_post_preview(&posts, &config.output_path, config.preview_char_limit)
    );

    let today = now.date_naive().to_string();
    let todays = store.posts_for_date(&today).await?;
    outcome.todays_posts = todays.len();

    if todays.is_empty() {
        println!("{}", console::no_posts_today());
    } else {
        println!("{}", console::todays_posts(&todays));
        let summaries = build_summaries(&todays, config.summary_char_budget);
        json::write_summaries(&summaries, &config.summary_path).await?;
        println!("{}", console::todays_summaries(&summaries, &config.summary_path));
    }

    info!(
        entries = outcome.entries,
        newly_stored = outcome.newly_stored,
        todays_posts = outcome.todays_posts,
        elapsed_secs = t0.elapsed().as_secs(),
        "Run complete"
    );
    Ok(outcome)
}
