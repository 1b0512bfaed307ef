//! Sentence-aligned previews of post bodies.
//!
//! Summaries are plain truncation: whole sentences are taken from the start
//! of the body until the character budget would be exceeded. Sentence
//! terminators are consumed by the split, so the kept sentences are joined
//! with single spaces and carry no punctuation of their own.

use crate::models::{StoredPost, Summary, CONTENT_UNAVAILABLE, SCRAPING_ERROR};
use crate::scrapers::text::split_sentences;
use crate::utils::truncate_chars;
use itertools::Itertools;
use tracing::{debug, instrument};

/// Returned whenever there is nothing worth summarizing.
pub const NO_SUMMARY: &str = "No summary available.";

/// Default character budget for [`summarize_post`].
pub const DEFAULT_BUDGET: usize = 200;

/// Summarize `content` within `budget` characters.
///
/// Sentences are accumulated while `running + sentence_len <= budget`, each
/// accepted sentence advancing `running` by its length plus one for the
/// joining space; the first sentence that does not fit stops the pass. If
/// the result is longer than `budget - 10` and does not end with a period it
/// is cut to `budget - 3` characters plus `...`, which may split a word.
pub fn summarize_post(content: &str, budget: usize) -> String {
    if content.is_empty() || content == CONTENT_UNAVAILABLE || content == SCRAPING_ERROR {
        return NO_SUMMARY.to_string();
    }

    let mut running = 0usize;
    let kept = split_sentences(content.trim())
        .into_iter()
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .take_while(|sentence| {
            let len = sentence.chars().count();
            if running + len <= budget {
                running += len + 1;
                true
            } else {
                false
            }
        })
        .join(" ");

    let summary = kept.trim();
    if summary.is_empty() {
        return NO_SUMMARY.to_string();
    }

    if summary.chars().count() > budget.saturating_sub(10) && !summary.ends_with('.') {
        return format!("{}...", truncate_chars(summary, budget.saturating_sub(3)));
    }
    summary.to_string()
}

/// Summaries for a day's stored posts, in the same order.
#[instrument(level = "info", skip_all, fields(posts = posts.len(), budget = budget))]
pub fn build_summaries(posts: &[StoredPost], budget: usize) -> Vec<Summary> {
    posts
        .iter()
        .map(|post| {
            let summary = summarize_post(&post.content, budget);
            debug!(url = %post.url, chars = summary.chars().count(), "Summarized post");
            Summary {
                title: post.title.clone(),
                url: post.url.clone(),
                author: post.author.clone(),
                date: post.date.clone(),
                summary,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sentences_fit() {
        assert_eq!(summarize_post("A. B. C.", DEFAULT_BUDGET), "A B C");
    }

    #[test]
    fn test_placeholders_have_no_summary() {
        assert_eq!(summarize_post("", DEFAULT_BUDGET), NO_SUMMARY);
        assert_eq!(summarize_post("Scraping error.", DEFAULT_BUDGET), NO_SUMMARY);
        assert_eq!(summarize_post("Content unavailable.", DEFAULT_BUDGET), NO_SUMMARY);
    }

    #[test]
    fn test_only_punctuation_has_no_summary() {
        assert_eq!(summarize_post(" ?!... ", DEFAULT_BUDGET), NO_SUMMARY);
    }

    #[test]
    fn test_first_sentence_over_budget() {
        let long = "x".repeat(250);
        assert_eq!(summarize_post(&format!("{long}. Short."), DEFAULT_BUDGET), NO_SUMMARY);
    }

    #[test]
    fn test_stops_at_first_sentence_that_does_not_fit() {
        // 9 + 1 + 9 = 19 fits in 20, the third sentence would not; 19 > 10 so
        // the result is then cut to 17 chars
        let text = "aaaaaaaaa. bbbbbbbbb. ccccccccc. d.";
        assert_eq!(summarize_post(text, 20), "aaaaaaaaa bbbbbbb...");
        assert_eq!(summarize_post(text, 50), "aaaaaaaaa bbbbbbbbb ccccccccc d");
    }

    #[test]
    fn test_near_budget_gets_ellipsis() {
        let first = "a".repeat(95);
        let second = "b".repeat(95);
        let summary = summarize_post(&format!("{first}. {second}."), 200);
        // 191 chars > 190, no trailing period: cut to 197 chars, which keeps it all
        assert_eq!(summary, format!("{first} {second}..."));
    }

    #[test]
    fn test_ellipsis_can_clip_mid_word() {
        let text = "abcdefghij klmnopqrst";
        let summary = summarize_post(text, 21);
        assert_eq!(summary, "abcdefghij klmnopq...");
    }

    #[test]
    fn test_never_exceeds_budget_during_accumulation() {
        let text = "One two three. Four five six seven. Eight nine ten eleven twelve. Thirteen.";
        for budget in 1..80 {
            let summary = summarize_post(text, budget);
            if summary == NO_SUMMARY {
                continue;
            }
            let body = summary.trim_end_matches("...");
            assert!(body.chars().count() <= budget, "budget {budget}: {summary:?}");
        }
    }

    #[test]
    fn test_build_summaries_keeps_metadata() {
        let posts = vec![StoredPost {
            title: "T".to_string(),
            url: "https://example.com/t".to_string(),
            author: "Unknown".to_string(),
            date: "2025-03-30".to_string(),
            content: "First. Second.".to_string(),
        }];
        let summaries = build_summaries(&posts, DEFAULT_BUDGET);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].summary, "First Second");
        assert_eq!(summaries[0].url, "https://example.com/t");
    }
}
