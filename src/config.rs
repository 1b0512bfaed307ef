//! Run configuration for the digest batch.
//!
//! Everything the batch needs to know about the outside world lives in a
//! [`DigestConfig`]: where the feed is, where artifacts and the SQLite store
//! go, how pages are fetched, and the ordered selector cascades used by the
//! content extractor. The config is loaded from an optional YAML file; every
//! field is defaulted, so a partial file only overrides what it names.
//!
//! ```yaml
//! feed_url: https://example.com/blog/rss/
//! request_delay_ms: 500
//! extraction:
//!   content_selectors: ["div.article-body", "article"]
//! ```

use crate::feed::lookback_cutoff;
use crate::summarize::DEFAULT_BUDGET;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

/// Errors raised while loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML in config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value for {field} in config file {path}: {message}")]
    Invalid {
        path: String,
        field: &'static str,
        message: String,
    },
}

/// Top-level configuration passed into the orchestrator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DigestConfig {
    /// RSS endpoint polled once per run.
    pub feed_url: String,
    /// Full-run JSON artifact.
    pub output_path: String,
    /// Daily summaries JSON artifact (overwritten each run).
    pub summary_path: String,
    /// SQLite database file.
    pub store_path: String,
    /// `User-Agent` sent with every article fetch.
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Sleep before every article fetch.
    pub request_delay_ms: u64,
    /// Trailing window, in days, of feed entries considered current.
    pub lookback_days: i64,
    pub summary_char_budget: usize,
    /// Content cap for the console preview of the first post.
    pub preview_char_limit: usize,
    /// When `true`, feed entries with an unparseable `pubDate` are skipped
    /// with a warning instead of aborting the run.
    pub skip_malformed_dates: bool,
    pub extraction: ExtractionRules,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://research.google/blog/rss/".to_string(),
            output_path: "blog_posts.json".to_string(),
            summary_path: "todays_summaries.json".to_string(),
            store_path: "blog_posts.db".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            request_timeout_secs: 15,
            request_delay_ms: 1000,
            lookback_days: 30,
            summary_char_budget: DEFAULT_BUDGET,
            preview_char_limit: 500,
            skip_malformed_dates: false,
            extraction: ExtractionRules::default(),
        }
    }
}

impl DigestConfig {
    /// Per-request timeout for feed and article fetches.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Pause taken before each article fetch.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Reject values that parse as YAML but cannot drive a run.
    ///
    /// # Returns
    ///
    /// The offending field name and a message.
    fn validate(&self) -> Result<(), (&'static str, String)> {
        lookback_cutoff(Utc::now(), self.lookback_days)
            .map(|_| ())
            .map_err(|e| ("lookback_days", e.to_string()))
    }
}

/// One step of a selector cascade.
///
/// With `attr` unset the matched element's stripped text is used; with `attr`
/// set, the value of that attribute is used instead (e.g. `content` on a
/// `<meta>` tag).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SelectorRule {
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
}

impl SelectorRule {
    pub fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attr: None,
        }
    }

    pub fn attr(selector: &str, attr: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attr: Some(attr.to_string()),
        }
    }
}

/// Selector cascades and thresholds for the content extractor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionRules {
    /// Page title candidates, first match wins. Used for logging only.
    pub title_selectors: Vec<String>,
    /// Author candidates, first non-empty match wins.
    pub author_selectors: Vec<SelectorRule>,
    /// Body containers, first one with non-empty text wins.
    pub content_selectors: Vec<String>,
    /// Tags whose subtrees are ignored inside the body container.
    pub stripped_tags: Vec<String>,
    /// Boilerplate regexes removed (case-insensitively) from full-page text.
    pub noise_patterns: Vec<String>,
    /// Text fragments must be strictly longer than this to be kept.
    pub min_fragment_chars: usize,
    /// Below this the full-page fallback kicks in.
    pub primary_min_chars: usize,
    /// Below this the feed description (or a placeholder) is used.
    pub final_min_chars: usize,
    /// Full-page sentence window is only applied above this many pieces.
    pub fallback_sentence_threshold: usize,
    pub fallback_sentence_skip: usize,
    pub fallback_sentence_take_until: usize,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            title_selectors: ["h1.post-title", "h3.post-title", "h1.entry-title", "title"]
                .map(String::from)
                .to_vec(),
            author_selectors: vec![
                SelectorRule::text("span.post-author.vcard"),
                SelectorRule::text("div.post-author"),
                SelectorRule::text(r#"a[rel="author"]"#),
                SelectorRule::text(".post-author"),
                SelectorRule::text("span.fn"),
                SelectorRule::text(".author-name"),
                SelectorRule::text(r#"meta[name="author"]"#),
                SelectorRule::attr(r#"meta[name="author"]"#, "content"),
            ],
            content_selectors: [
                "div.post-body.entry-content",
                "div.post-body",
                ".entry-content",
                "#post-body-1234567890",
                "main",
                "article",
            ]
            .map(String::from)
            .to_vec(),
            stripped_tags: ["script", "style", "nav", "footer", "aside"]
                .map(String::from)
                .to_vec(),
            noise_patterns: [
                r"https?://\S+",
                r"\s*Share:\s*",
                r"\s*Posted by\s*",
                r"\s*at\s*\d{1,2}:\d{2} [AP]M\s*",
                r"\s*Labels:\s*",
                r"\s*0 comments?\s*",
                r"\s*Subscribe to:\s*",
            ]
            .map(String::from)
            .to_vec(),
            min_fragment_chars: 15,
            primary_min_chars: 200,
            final_min_chars: 100,
            fallback_sentence_threshold: 10,
            fallback_sentence_skip: 2,
            fallback_sentence_take_until: 10,
        }
    }
}

/// Load a [`DigestConfig`], falling back to defaults when no path is given.
///
/// # Arguments
///
/// * `path` - Optional path to a YAML file; missing fields keep their defaults
///
/// # Returns
///
/// The loaded config, or a [`ConfigError`] when the file cannot be read,
/// is not valid YAML, or holds an unusable value.
#[instrument(level = "info")]
pub fn load_config(path: Option<&str>) -> Result<DigestConfig, ConfigError> {
    let Some(path) = path else {
        info!("No config file given; using built-in defaults");
        return Ok(DigestConfig::default());
    };

    let raw = std::fs::read_to_string(Path::new(path)).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    let config = parse_config(&raw).map_err(|source| ConfigError::Yaml {
        path: path.to_string(),
        source,
    })?;
    config
        .validate()
        .map_err(|(field, message)| ConfigError::Invalid {
            path: path.to_string(),
            field,
            message,
        })?;
    info!(feed_url = %config.feed_url, store_path = %config.store_path, "Loaded configuration");
    Ok(config)
}

/// Deserialize YAML text, treating a blank file as all defaults.
fn parse_config(raw: &str) -> Result<DigestConfig, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(DigestConfig::default());
    }
    serde_yaml::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_the_research_blog() {
        let config = DigestConfig::default();
        assert_eq!(config.feed_url, "https://research.google/blog/rss/");
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.request_delay(), Duration::from_secs(1));
        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.summary_char_budget, 200);
        assert!(!config.skip_malformed_dates);
        assert_eq!(
            config.extraction.author_selectors.last(),
            Some(&SelectorRule::attr(r#"meta[name="author"]"#, "content"))
        );
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = r#"
feed_url: https://example.com/feed.xml
request_delay_ms: 0
extraction:
  content_selectors: ["div.article-body"]
  min_fragment_chars: 20
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.feed_url, "https://example.com/feed.xml");
        assert_eq!(config.request_delay_ms, 0);
        assert_eq!(config.output_path, "blog_posts.json");
        assert_eq!(config.extraction.content_selectors, vec!["div.article-body"]);
        assert_eq!(config.extraction.min_fragment_chars, 20);
        assert_eq!(config.extraction.title_selectors.len(), 4);
    }

    #[test]
    fn test_author_rules_accept_attr() {
        let yaml = r#"
extraction:
  author_selectors:
    - selector: "span.byline"
    - selector: "meta[property='article:author']"
      attr: content
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(
            config.extraction.author_selectors,
            vec![
                SelectorRule::text("span.byline"),
                SelectorRule::attr("meta[property='article:author']", "content"),
            ]
        );
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = parse_config("   \n").unwrap();
        assert_eq!(config.store_path, "blog_posts.db");
    }

    #[test]
    fn test_load_config_without_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config.summary_path, "todays_summaries.json");
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digest.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "lookback_days: 7\nskip_malformed_dates: true").unwrap();

        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.lookback_days, 7);
        assert!(config.skip_malformed_dates);
    }

    #[test]
    fn test_load_config_missing_file_errors() {
        let err = load_config(Some("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_config_bad_yaml_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "lookback_days: [not, a, number]").unwrap();

        let err = load_config(path.to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn test_load_config_rejects_unusable_lookback() {
        let dir = tempfile::tempdir().unwrap();
        for days in ["-3", "9223372036854775807"] {
            let path = dir.path().join("lookback.yaml");
            std::fs::write(&path, format!("lookback_days: {days}")).unwrap();

            let err = load_config(path.to_str()).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { field: "lookback_days", .. }),
                "{days}: {err}"
            );
        }
    }
}
