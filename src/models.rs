//! Data models shared by the feed reader, extractor, store and outputs.
//!
//! - [`FeedEntry`]: one item from the RSS feed inside the lookback window
//! - [`ScrapedDetails`]: author and body recovered from the article page
//! - [`ExtractedPost`]: a scraped post ready to be persisted and written out
//! - [`StoredPost`]: a row of the `posts` table
//! - [`Summary`]: a stored post with its body replaced by a short preview

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Author used whenever neither the page nor the feed names one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";
/// Body placeholder when no usable text was found.
pub const CONTENT_UNAVAILABLE: &str = "Content unavailable.";
/// Body placeholder when the scrape itself failed.
pub const SCRAPING_ERROR: &str = "Scraping error.";

/// A syndicated item that passed the lookback filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub url: String,
    /// Publication timestamp with the offset it was published in.
    pub published: DateTime<FixedOffset>,
    /// Feed-supplied author, `"Unknown"` when absent.
    pub author: String,
    /// Feed-supplied summary/description, possibly empty.
    pub description: String,
}

impl FeedEntry {
    /// UTC calendar date of publication.
    pub fn published_date(&self) -> NaiveDate {
        self.published.naive_utc().date()
    }
}

/// Outcome of scraping one article page. The content is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedDetails {
    pub author: String,
    pub content: String,
}

impl ScrapedDetails {
    /// Details used when a fetch fails or a page yields nothing usable:
    /// unknown author and the feed description, or `placeholder` if that is
    /// empty.
    pub fn fallback(description: &str, placeholder: &str) -> Self {
        Self {
            author: UNKNOWN_AUTHOR.to_string(),
            content: description_or(description, placeholder),
        }
    }
}

/// Returns `description` unless it is empty, in which case `placeholder`.
pub fn description_or(description: &str, placeholder: &str) -> String {
    if description.is_empty() {
        placeholder.to_string()
    } else {
        description.to_string()
    }
}

/// A scraped post, as persisted and written to the full-run artifact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractedPost {
    pub title: String,
    pub url: String,
    pub author: String,
    /// ISO calendar date (`YYYY-MM-DD`, UTC).
    pub date: String,
    pub content: String,
}

impl ExtractedPost {
    pub fn from_entry(entry: &FeedEntry, details: ScrapedDetails) -> Self {
        Self {
            title: entry.title.clone(),
            url: entry.url.clone(),
            author: details.author,
            date: entry.published_date().to_string(),
            content: details.content,
        }
    }
}

/// A row of the `posts` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, sqlx::FromRow)]
pub struct StoredPost {
    pub title: String,
    pub url: String,
    pub author: String,
    pub date: String,
    pub content: String,
}

impl From<&ExtractedPost> for StoredPost {
    fn from(post: &ExtractedPost) -> Self {
        Self {
            title: post.title.clone(),
            url: post.url.clone(),
            author: post.author.clone(),
            date: post.date.clone(),
            content: post.content.clone(),
        }
    }
}

/// Entry of the daily summaries artifact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Summary {
    pub title: String,
    pub url: String,
    pub author: String,
    pub date: String,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(published: &str) -> FeedEntry {
        FeedEntry {
            title: "Title".to_string(),
            url: "https://example.com/post".to_string(),
            published: DateTime::parse_from_rfc3339(published).unwrap(),
            author: UNKNOWN_AUTHOR.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_published_date_is_utc() {
        // 01:30 at +0200 is still the previous day in UTC
        let e = entry("2025-03-10T01:30:00+02:00");
        assert_eq!(e.published_date().to_string(), "2025-03-09");
    }

    #[test]
    fn test_fallback_prefers_description() {
        let d = ScrapedDetails::fallback("From the feed", CONTENT_UNAVAILABLE);
        assert_eq!(d.author, "Unknown");
        assert_eq!(d.content, "From the feed");

        let d = ScrapedDetails::fallback("", SCRAPING_ERROR);
        assert_eq!(d.content, "Scraping error.");
    }

    #[test]
    fn test_extracted_post_from_entry() {
        let e = entry("2025-03-10T12:00:00+00:00");
        let post = ExtractedPost::from_entry(
            &e,
            ScrapedDetails {
                author: "Jane Doe".to_string(),
                content: "Body".to_string(),
            },
        );
        assert_eq!(post.date, "2025-03-10");
        assert_eq!(post.author, "Jane Doe");
        assert_eq!(StoredPost::from(&post).url, "https://example.com/post");
    }
}
