//! Ordered selector cascades.
//!
//! A [`Cascade`] is a list of steps, each pairing a compiled CSS selector
//! with the way a value is read from the element it matches. Steps are
//! tried in order and the first one that produces a non-empty value wins.
//! Selectors come from [`ExtractionRules`] so new page templates can be
//! handled by editing the config rather than the code.

use super::ScrapeError;
use super::text::stripped_text;
use crate::config::{ExtractionRules, SelectorRule};
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// How a value is read from a matched element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extract {
    /// Trimmed text nodes concatenated without separator.
    StrippedText,
    /// Value of the named attribute, trimmed.
    Attribute(String),
}

#[derive(Debug)]
struct CascadeStep {
    selector: Selector,
    extract: Extract,
}

impl CascadeStep {
    fn read(&self, element: ElementRef<'_>) -> Option<String> {
        let value = match &self.extract {
            Extract::StrippedText => stripped_text(element),
            Extract::Attribute(name) => element.value().attr(name)?.trim().to_string(),
        };
        (!value.is_empty()).then_some(value)
    }
}

/// An ordered list of selector steps; the first productive step wins.
#[derive(Debug, Default)]
pub struct Cascade {
    steps: Vec<CascadeStep>,
}

impl Cascade {
    /// Compile one step per rule, preserving order.
    ///
    /// # Arguments
    ///
    /// * `rules` - Selector rules, each reading text or a named attribute
    ///
    /// # Returns
    ///
    /// The cascade, or [`ScrapeError::Selector`] naming the first selector
    /// that does not parse.
    pub fn compile(rules: &[SelectorRule]) -> Result<Self, ScrapeError> {
        let steps = rules
            .iter()
            .map(|rule| {
                Ok(CascadeStep {
                    selector: parse_selector(&rule.selector)?,
                    extract: match &rule.attr {
                        Some(name) => Extract::Attribute(name.clone()),
                        None => Extract::StrippedText,
                    },
                })
            })
            .collect::<Result<Vec<_>, ScrapeError>>()?;
        Ok(Self { steps })
    }

    /// Compile plain selectors that all read stripped text.
    pub fn compile_text(selectors: &[String]) -> Result<Self, ScrapeError> {
        let rules: Vec<SelectorRule> = selectors.iter().map(|s| SelectorRule::text(s)).collect();
        Self::compile(&rules)
    }

    /// Value from the first step whose first matching element yields
    /// something non-empty.
    pub fn first_value(&self, document: &Html) -> Option<String> {
        self.steps.iter().find_map(|step| {
            document
                .select(&step.selector)
                .next()
                .and_then(|element| step.read(element))
        })
    }

    /// First element, in step order, whose stripped text is non-empty.
    pub fn first_element<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.steps.iter().find_map(|step| {
            document
                .select(&step.selector)
                .next()
                .filter(|element| !stripped_text(*element).is_empty())
        })
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// [`ExtractionRules`] with every selector and pattern compiled.
#[derive(Debug)]
pub struct CompiledRules {
    pub title: Cascade,
    pub author: Cascade,
    pub content: Cascade,
    pub stripped_tags: HashSet<String>,
    pub noise_patterns: Vec<Regex>,
    pub min_fragment_chars: usize,
    pub primary_min_chars: usize,
    pub final_min_chars: usize,
    pub fallback_sentence_threshold: usize,
    pub fallback_sentence_skip: usize,
    pub fallback_sentence_take_until: usize,
}

impl CompiledRules {
    /// Compile every cascade and noise pattern in `rules`.
    ///
    /// Noise patterns are matched case-insensitively and stripped tag names
    /// are lowercased to match parsed element names.
    ///
    /// # Returns
    ///
    /// The compiled rules, or the first selector or pattern error.
    pub fn compile(rules: &ExtractionRules) -> Result<Self, ScrapeError> {
        let noise_patterns = rules
            .noise_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ScrapeError::Pattern {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            title: Cascade::compile_text(&rules.title_selectors)?,
            author: Cascade::compile(&rules.author_selectors)?,
            content: Cascade::compile_text(&rules.content_selectors)?,
            stripped_tags: rules
                .stripped_tags
                .iter()
                .map(|tag| tag.to_ascii_lowercase())
                .collect(),
            noise_patterns,
            min_fragment_chars: rules.min_fragment_chars,
            primary_min_chars: rules.primary_min_chars,
            final_min_chars: rules.final_min_chars,
            fallback_sentence_threshold: rules.fallback_sentence_threshold,
            fallback_sentence_skip: rules.fallback_sentence_skip,
            fallback_sentence_take_until: rules.fallback_sentence_take_until,
        })
    }
}

/// Parse one CSS selector into a [`ScrapeError`]-typed result.
fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
