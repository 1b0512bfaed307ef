//! RSS feed reader.
//!
//! Fetches the blog's RSS 2.0 document, deserializes its items with
//! `quick-xml`'s serde support and keeps the ones published inside the
//! trailing lookback window.
//!
//! Publication timestamps are parsed strictly against the RFC 822 layout
//! used by the feed (`Tue, 04 Mar 2025 10:00:00 +0000`). An item that does
//! not match aborts the whole read unless `skip_malformed` is set, in which
//! case it is dropped with a warning.

use crate::models::{FeedEntry, UNKNOWN_AUTHOR};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// `strftime` layout of `<pubDate>`.
pub const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed XML could not be parsed: {0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("feed item {index} has no <{field}>")]
    MissingField { index: usize, field: &'static str },
    #[error("lookback window of {days} days is out of range")]
    LookbackOutOfRange { days: i64 },
    #[error("feed item {index} has an unparseable pubDate {value:?}: {source}")]
    Timestamp {
        index: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    // RSS allows several bylines per item; the first non-empty one is used.
    #[serde(default)]
    author: Vec<String>,
    #[serde(rename = "creator", alias = "dc:creator", default)]
    creator: Vec<String>,
    summary: Option<String>,
    description: Option<String>,
}

/// Fetch the feed at `url` and return the entries inside the lookback window.
#[instrument(level = "info", skip(client))]
pub async fn fetch_recent_entries(
    client: &reqwest::Client,
    url: &str,
    now: DateTime<Utc>,
    lookback_days: i64,
    skip_malformed: bool,
) -> Result<Vec<FeedEntry>, FeedError> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    debug!(bytes = body.len(), "Fetched feed document");
    parse_recent_entries(&body, now, lookback_days, skip_malformed)
}

/// Parse an RSS document and keep entries published at or after
/// `now - lookback_days`.
///
/// # Arguments
///
/// * `xml` - RSS 2.0 document text
/// * `now` - End of the lookback window
/// * `lookback_days` - Window length; must be non-negative
/// * `skip_malformed` - Drop items missing a link or valid `pubDate` instead of failing
///
/// # Returns
///
/// Kept entries in feed order, or the first [`FeedError`].
pub fn parse_recent_entries(
    xml: &str,
    now: DateTime<Utc>,
    lookback_days: i64,
    skip_malformed: bool,
) -> Result<Vec<FeedEntry>, FeedError> {
    let cutoff = lookback_cutoff(now, lookback_days)?;
    let rss: Rss = quick_xml::de::from_str(xml)?;
    let total = rss.channel.items.len();

    let mut entries = Vec::new();
    for (index, item) in rss.channel.items.into_iter().enumerate() {
        let entry = match entry_from_item(index, item) {
            Ok(entry) => entry,
            Err(e) if skip_malformed => {
                warn!(index, error = %e, "Skipping malformed feed item");
                continue;
            }
            Err(e) => return Err(e),
        };
        if entry.published.with_timezone(&Utc) >= cutoff {
            entries.push(entry);
        } else {
            debug!(url = %entry.url, published = %entry.published, "Outside lookback window");
        }
    }

    info!(total, kept = entries.len(), %cutoff, "Filtered feed entries");
    Ok(entries)
}

/// Earliest publication time inside the window ending at `now`.
///
/// # Errors
///
/// [`FeedError::LookbackOutOfRange`] when `lookback_days` is negative or too
/// large for a timestamp.
pub fn lookback_cutoff(now: DateTime<Utc>, lookback_days: i64) -> Result<DateTime<Utc>, FeedError> {
    let out_of_range = || FeedError::LookbackOutOfRange {
        days: lookback_days,
    };
    if lookback_days < 0 {
        return Err(out_of_range());
    }
    TimeDelta::try_days(lookback_days)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(out_of_range)
}

/// Parse a `<pubDate>` value.
pub fn parse_pub_date(value: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_str(value.trim(), PUB_DATE_FORMAT)
}

fn entry_from_item(index: usize, item: RssItem) -> Result<FeedEntry, FeedError> {
    let url = non_empty(item.link).ok_or(FeedError::MissingField {
        index,
        field: "link",
    })?;
    let raw_date = item.pub_date.ok_or(FeedError::MissingField {
        index,
        field: "pubDate",
    })?;
    let published = parse_pub_date(&raw_date).map_err(|source| FeedError::Timestamp {
        index,
        value: raw_date.clone(),
        source,
    })?;

    let author = first_non_empty(item.author)
        .or_else(|| first_non_empty(item.creator))
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let description = match item.summary {
        Some(summary) => summary,
        None => item.description.unwrap_or_default().trim().to_string(),
    };

    Ok(FeedEntry {
        title: non_empty(item.title).unwrap_or_else(|| "Untitled".to_string()),
        url,
        published,
        author,
        description,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn first_non_empty(values: Vec<String>) -> Option<String> {
    values.into_iter().find_map(|v| non_empty(Some(v)))
}
