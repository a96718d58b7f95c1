//! Boundary detection between display text and the keyword section.
//!
//! A title or description is "prose, then keywords": everything from the
//! first anchored keyword token onward is grammar, everything before it is
//! what the host should display. Absence of a keyword is the normal case,
//! not an error.

use km_core::{KeywordMap, ParseWarning};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::html::normalize_content;
use crate::splitter::extract_keywords;

/// First keyword token in a text blob: `_` plus one alphanumeric plus any
/// further word characters, at line start, after whitespace, or after a
/// `<br>` the builder auto-inserts. Looser than the splitter's token (one
/// trailing character is enough) so that a lone short token still marks the
/// boundary and gets stripped from display text.
static KEYWORD_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:^|\s|<br\s*/?>)(_[a-zA-Z0-9][a-zA-Z0-9_]*)").expect("keyword start pattern")
});

/// Byte index of the first keyword token, or `None` when the text has no
/// keyword section.
#[must_use]
pub fn keyword_start_index(text: &str) -> Option<usize> {
    KEYWORD_START
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|token| token.start())
}

/// The display text: everything before the keyword boundary, trimmed. Texts
/// without keywords come back trimmed but otherwise unchanged.
#[must_use]
pub fn clean_up_keywords(text: &str) -> String {
    match keyword_start_index(text) {
        Some(index) => text[..index].trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Extract keywords from a text blob into the supplied map, returning any
/// warnings. Merging into a shared map lets callers combine sources (title
/// plus description) into one per-entity keyword set.
pub fn get_keywords_into(text: &str, map: &mut KeywordMap) -> Vec<ParseWarning> {
    match keyword_start_index(text) {
        Some(index) => extract_keywords(text[index..].trim(), map),
        None => Vec::new(),
    }
}

/// Extract keywords from a text blob. Empty map when there are none.
#[must_use]
pub fn get_keywords(text: &str) -> KeywordMap {
    let mut map = KeywordMap::new();
    let _ = get_keywords_into(text, &mut map);
    map
}

/// Content variant: flatten rich-text HTML (paragraph and break tags become
/// line breaks, entities are decoded) before extracting, so declarations
/// embedded in rich-text blocks parse like plain text.
pub fn get_keywords_from_content_into(html: &str, map: &mut KeywordMap) -> Vec<ParseWarning> {
    let normalized = normalize_content(html);
    get_keywords_into(&normalized, map)
}

/// Content variant of [`get_keywords`].
#[must_use]
pub fn get_keywords_from_content(html: &str) -> KeywordMap {
    let mut map = KeywordMap::new();
    let _ = get_keywords_from_content_into(html, &mut map);
    map
}

/// Display text for rich-text content, computed on the flattened form.
#[must_use]
pub fn clean_up_content(html: &str) -> String {
    clean_up_keywords(&normalize_content(html))
}
