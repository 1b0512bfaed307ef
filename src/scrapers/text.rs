//! Text gathering and noise filtering for scraped pages.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::collections::HashSet;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());
static ALL_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// Tags whose text never counts as visible page text.
const INVISIBLE_TAGS: [&str; 3] = ["script", "style", "template"];

/// Every descendant text node trimmed, empty ones dropped, concatenated
/// without a separator.
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Replace runs of whitespace with a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Split on runs of sentence-ending punctuation. Empty pieces are kept so
/// callers can count them.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_END.split(text).collect()
}

/// Whether a trimmed text fragment carries article prose: longer than
/// `min_chars`, not a bare number, and no embedded link.
pub fn is_content_fragment(fragment: &str, min_chars: usize) -> bool {
    fragment.chars().count() > min_chars
        && !ALL_DIGITS.is_match(fragment)
        && !fragment.contains("http")
}

/// Body text of a content container.
///
/// Text under any of `stripped_tags` (below the container) is ignored; the
/// remaining text nodes are trimmed, gated by [`is_content_fragment`],
/// joined with spaces and whitespace-collapsed.
pub fn container_text(
    container: ElementRef<'_>,
    stripped_tags: &HashSet<String>,
    min_fragment_chars: usize,
) -> String {
    let container_id = container.id();
    let joined = container
        .descendants()
        .filter_map(|node| {
            let Node::Text(text) = node.value() else {
                return None;
            };
            let hidden = node
                .ancestors()
                .take_while(|ancestor| ancestor.id() != container_id)
                .filter_map(|ancestor| ancestor.value().as_element())
                .any(|element| stripped_tags.contains(element.name()));
            if hidden {
                return None;
            }
            let fragment = text.trim();
            is_content_fragment(fragment, min_fragment_chars).then_some(fragment)
        })
        .join(" ");
    collapse_whitespace(&joined)
}

/// All visible text of the page, each text node trimmed and joined by a
/// single space.
///
/// When a content `container` is given, text under any of `stripped_tags`
/// below it is left out too, so the page reads as if those elements had been
/// removed before the fallback ran.
pub fn visible_text(
    document: &Html,
    container: Option<ElementRef<'_>>,
    stripped_tags: &HashSet<String>,
) -> String {
    let removed: HashSet<_> = container
        .map(|container| {
            container
                .descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .filter(|element| stripped_tags.contains(element.value().name()))
                .map(|element| element.id())
                .collect()
        })
        .unwrap_or_default();

    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let Node::Text(text) = node.value() else {
                return None;
            };
            let hidden = node.ancestors().any(|ancestor| {
                removed.contains(&ancestor.id())
                    || ancestor
                        .value()
                        .as_element()
                        .is_some_and(|element| INVISIBLE_TAGS.contains(&element.name()))
            });
            let fragment = text.trim();
            (!hidden && !fragment.is_empty()).then_some(fragment)
        })
        .join(" ")
}

/// Remove every boilerplate pattern, then collapse whitespace.
pub fn strip_noise(text: &str, patterns: &[Regex]) -> String {
    let cleaned = patterns
        .iter()
        .fold(text.to_string(), |acc, pattern| {
            pattern.replace_all(&acc, "").into_owned()
        });
    collapse_whitespace(&cleaned)
}

/// Drop an assumed header and trailer from page text.
///
/// When the text splits into more than `threshold` sentence pieces, pieces
/// `skip..take_until` are trimmed and joined with spaces; otherwise the text
/// is returned unchanged.
pub fn sentence_window(text: &str, threshold: usize, skip: usize, take_until: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.len() <= threshold {
        return text.to_string();
    }
    let end = take_until.min(sentences.len());
    let start = skip.min(end);
    sentences[start..end].iter().map(|s| s.trim()).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> HashSet<String> {
        ["script", "style", "nav", "footer", "aside"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_is_content_fragment() {
        assert!(is_content_fragment("This sentence is long enough.", 15));
        assert!(!is_content_fragment("Exactly 15 char", 15));
        assert!(!is_content_fragment("1234567890123456789", 15));
        assert!(!is_content_fragment("See https://example.com/page for more", 15));
    }

    #[test]
    fn test_container_text_filters_noise() {
        let html = Html::parse_document(
            r#"<div class="post-body">
                <p>The first paragraph carries real prose.</p>
                <span>Short</span>
                <span>20250301202503012025</span>
                <p>Read it at http://example.com/long/link/here</p>
                <script>var tracking = "a very long script body here";</script>
                <aside><p>Related posts you might also enjoy reading</p></aside>
                <nav><a>Navigation label that is rather long</a></nav>
                <p>The second   paragraph
                   spans lines.</p>
            </div>"#,
        );
        let container = html
            .select(&scraper::Selector::parse("div.post-body").unwrap())
            .next()
            .unwrap();
        assert_eq!(
            container_text(container, &tags(), 15),
            "The first paragraph carries real prose. The second paragraph spans lines."
        );
    }

    #[test]
    fn test_container_itself_may_be_a_stripped_tag() {
        let html = Html::parse_document(
            "<body><article><p>Only the descendants are checked here.</p></article></body>",
        );
        let container = html
            .select(&scraper::Selector::parse("article").unwrap())
            .next()
            .unwrap();
        let mut only_article = HashSet::new();
        only_article.insert("article".to_string());
        assert_eq!(
            container_text(container, &only_article, 15),
            "Only the descendants are checked here."
        );
    }

    #[test]
    fn test_visible_text_skips_scripts() {
        let html = Html::parse_document(
            "<html><head><title>T</title><style>p{}</style></head><body><p>One</p><script>x()</script><p> Two </p></body></html>",
        );
        assert_eq!(visible_text(&html, None, &tags()), "T One Two");
    }

    #[test]
    fn test_visible_text_drops_stripped_tags_inside_container() {
        let html = Html::parse_document(
            "<body><nav>Site nav</nav><article><p>Body</p><footer>Article footer</footer>\
             <aside>Aside</aside></article><footer>Page footer</footer></body>",
        );
        let container = html
            .select(&scraper::Selector::parse("article").unwrap())
            .next()
            .unwrap();
        assert_eq!(
            visible_text(&html, Some(container), &tags()),
            "Site nav Body Page footer"
        );
    }

    #[test]
    fn test_strip_noise_is_case_insensitive() {
        let patterns: Vec<Regex> = [r"https?://\S+", r"\s*Share:\s*", r"\s*Labels:\s*"]
            .iter()
            .map(|p| regex::RegexBuilder::new(p).case_insensitive(true).build().unwrap())
            .collect();
        assert_eq!(
            strip_noise("Intro. SHARE: Body   text https://x.io/a", &patterns),
            "Intro.Body text"
        );
    }

    #[test]
    fn test_sentence_window_short_text_unchanged() {
        let text = "One. Two. Three.";
        assert_eq!(sentence_window(text, 10, 2, 10), text);
    }

    #[test]
    fn test_sentence_window_drops_header() {
        let text = (1..=12).map(|i| format!("Sentence {i}.")).join(" ");
        assert_eq!(
            sentence_window(&text, 10, 2, 10),
            "Sentence 3 Sentence 4 Sentence 5 Sentence 6 Sentence 7 Sentence 8 Sentence 9 Sentence 10"
        );
    }
}
