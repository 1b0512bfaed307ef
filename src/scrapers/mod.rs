//! Article scraping: fetch a post's page and recover its author and body.
//!
//! Extraction is a fixed sequence of best-effort steps, each falling through
//! to the next:
//!
//! 1. **Fetch** with a pre-request delay, browser user agent and timeout.
//!    Any status other than `200` ends the scrape with the feed description.
//! 2. **Title** via the title cascade (logged only).
//! 3. **Author** via the author cascade, defaulting to `"Unknown"`.
//! 4. **Primary body** from the first content container with text, with
//!    stripped tags removed and short, numeric or link-bearing fragments
//!    dropped.
//! 5. **Full-page fallback** when the primary body is too short: visible
//!    page text minus boilerplate, trimmed to a sentence window.
//! 6. **Final fallback** to the feed description or `"Content unavailable."`.
//!
//! Network failures at any point discard partial progress and yield the
//! feed description or `"Scraping error."`.
//!
//! # Submodules
//!
//! - [`cascade`]: compiled, ordered selector cascades
//! - [`text`]: text gathering and noise filters

pub mod cascade;
pub mod text;

use crate::config::DigestConfig;
use crate::models::{
    description_or, ScrapedDetails, CONTENT_UNAVAILABLE, SCRAPING_ERROR, UNKNOWN_AUTHOR,
};
use crate::utils::{truncate_chars, url_slug};
use cascade::CompiledRules;
use reqwest::StatusCode;
use scraper::Html;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
    #[error("invalid noise pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Fetches article pages and runs the extraction steps over them.
#[derive(Debug)]
pub struct PostScraper {
    client: reqwest::Client,
    rules: CompiledRules,
    delay: Duration,
}

impl PostScraper {
    /// Build the HTTP client and compile the extraction rules.
    pub fn new(config: &DigestConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout())
            .build()?;
        let rules = CompiledRules::compile(&config.extraction)?;
        debug!(
            title_steps = rules.title.len(),
            author_steps = rules.author.len(),
            content_steps = rules.content.len(),
            "Compiled extraction rules"
        );
        Ok(Self {
            client,
            rules,
            delay: config.request_delay(),
        })
    }

    /// Scrape one post. Never fails and never returns empty content.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn scrape(&self, url: &str, description: &str) -> ScrapedDetails {
        match self.try_scrape(url, description).await {
            Ok(details) => details,
            Err(e) => {
                error!(%url, error = %e, "Error scraping post");
                ScrapedDetails::fallback(description, SCRAPING_ERROR)
            }
        }
    }

    async fn try_scrape(&self, url: &str, description: &str) -> Result<ScrapedDetails, ScrapeError> {
        sleep(self.delay).await;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "Failed to fetch post");
            return Ok(ScrapedDetails::fallback(description, CONTENT_UNAVAILABLE));
        }
        let body = response.text().await?;
        Ok(extract_details(&self.rules, &body, url, description))
    }
}

/// Run extraction steps 2-6 over a fetched page.
pub fn extract_details(
    rules: &CompiledRules,
    html: &str,
    url: &str,
    description: &str,
) -> ScrapedDetails {
    let document = Html::parse_document(html);

    match rules.title.first_value(&document) {
        Some(title) if !is_description_prefix(&title, description) => {
            info!("Scraping: {}...", truncate_chars(&title, 50));
        }
        _ => info!("Scraping {}...", url_slug(url)),
    }

    let author = rules
        .author
        .first_value(&document)
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    let container = rules.content.first_element(&document);
    let mut content = container
        .map(|container| {
            text::container_text(container, &rules.stripped_tags, rules.min_fragment_chars)
        })
        .unwrap_or_default();

    if content.chars().count() < rules.primary_min_chars {
        debug!(
            chars = content.chars().count(),
            "Primary content too short; using full page text"
        );
        let page = text::visible_text(&document, container, &rules.stripped_tags);
        let cleaned = text::strip_noise(&page, &rules.noise_patterns);
        content = text::sentence_window(
            &cleaned,
            rules.fallback_sentence_threshold,
            rules.fallback_sentence_skip,
            rules.fallback_sentence_take_until,
        );
    }

    if content.chars().count() < rules.final_min_chars {
        debug!(
            chars = content.chars().count(),
            "Page content too short; using feed description"
        );
        content = description_or(description, CONTENT_UNAVAILABLE);
    }

    ScrapedDetails { author, content }
}

/// Whether `title` is exactly the leading part of `description`.
fn is_description_prefix(title: &str, description: &str) -> bool {
    truncate_chars(description, title.chars().count()) == title
}
