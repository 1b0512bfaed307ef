//! Human-readable run report.
//!
//! Each function renders one block of the report as a `String`; the
//! orchestrator prints them to stdout in order.

use crate::models::{ExtractedPost, StoredPost, Summary};
use crate::utils::truncate_chars;
use itertools::Itertools;
use serde::Serialize;

/// Pretty JSON for the report; serialization failures are rendered inline.
fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}

/// Notice printed when the feed has nothing inside the lookback window.
pub fn no_recent_posts(lookback_days: i64) -> String {
    format!("No new posts in the last {lookback_days} days.")
}

/// The first post as JSON with its content capped at `limit` characters,
/// followed by a pointer to the full artifact.
///
/// # Arguments
///
/// * `posts` - Every post scraped this run, in feed order
/// * `output_path` - Where the full-run artifact was written
/// * `limit` - Character cap for the previewed content; longer content gets `...`
///
/// # Returns
///
/// The preview block, or an empty string when there are no posts.
pub fn first_post_preview(posts: &[ExtractedPost], output_path: &str, limit: usize) -> String {
    let Some(first) = posts.first() else {
        return String::new();
    };
    let mut preview = first.clone();
    if preview.content.chars().count() > limit {
        preview.content = format!("{}...", truncate_chars(&preview.content, limit));
    }
    format!(
        "{}\n\n... (full content for all {} posts saved to {})",
        pretty(&preview),
        posts.len(),
        output_path
    )
}

/// Today's stored posts, one pretty JSON object each.
pub fn todays_posts(posts: &[StoredPost]) -> String {
    format!("\nToday's blog posts:\n{}", posts.iter().map(pretty).join("\n"))
}

/// Today's summaries under a header naming the summaries artifact.
///
/// # Arguments
///
/// * `summaries` - Summaries in store order
/// * `summary_path` - Where the summaries artifact was written
pub fn todays_summaries(summaries: &[Summary], summary_path: &str) -> String {
    format!(
        "\nSummaries of today's posts saved to {}:\n{}",
        summary_path,
        summaries.iter().map(pretty).join("\n")
    )
}

/// Notice printed when nothing in the store is dated today.
pub fn no_posts_today() -> String {
    "\nNo new posts today.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(content: &str) -> ExtractedPost {
        ExtractedPost {
            title: "T".to_string(),
            url: "https://example.com/t".to_string(),
            author: "Unknown".to_string(),
            date: "2025-03-30".to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_preview_caps_content() {
        let long = "é".repeat(600);
        let report = first_post_preview(&[post(&long), post("x")], "out.json", 500);
        assert!(report.contains(&format!("\"content\": \"{}...\"", "é".repeat(500))));
        assert!(report.ends_with("... (full content for all 2 posts saved to out.json)"));
    }

    #[test]
    fn test_preview_keeps_short_content() {
        let report = first_post_preview(&[post("short body")], "out.json", 500);
        assert!(report.contains("\"content\": \"short body\""));
        assert!(!report.contains("short body..."));
    }

    #[test]
    fn test_preview_of_nothing_is_empty() {
        assert_eq!(first_post_preview(&[], "out.json", 500), "");
    }

    #[test]
    fn test_notices() {
        assert_eq!(no_recent_posts(30), "No new posts in the last 30 days.");
        assert_eq!(no_posts_today(), "\nNo new posts today.");
    }

    #[test]
    fn test_summaries_block_lists_each() {
        let summary = Summary {
            title: "T".to_string(),
            url: "https://example.com/t".to_string(),
            author: "Unknown".to_string(),
            date: "2025-03-30".to_string(),
            summary: "Short".to_string(),
        };
        let block = todays_summaries(&[summary.clone(), summary], "s.json");
        assert!(block.starts_with("\nSummaries of today's posts saved to s.json:\n{"));
        assert_eq!(block.matches("\"summary\": \"Short\"").count(), 2);
    }
}
