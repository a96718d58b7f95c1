//! Keyword splitting: turn an isolated keyword section into a map of
//! keyword name to parsed declarations.

use km_core::{KeywordMap, KeywordName, ParseWarning, ZERO_WIDTH_SPACE};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::params::parse_parameters;

/// A keyword token inside a section: `_`, one alphanumeric, then one or more
/// word characters, anchored at line start, after whitespace, or after a
/// builder-inserted `<br>`. The anchor doubles as the `__` escape: a token
/// preceded by another underscore is never captured.
static KEYWORD_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:^|\s|<br\s*/?>)(_[a-zA-Z0-9][a-zA-Z0-9_]+)").expect("keyword token pattern")
});

/// Split a keyword section into the supplied map.
///
/// The section alternates between keyword tokens and the text that follows
/// each token up to the next one. A token whose tail starts with `=` carries
/// parameters; a bare token registers as a presence-only flag. Repeated
/// declarations of one keyword accumulate in order, and the map itself
/// accumulates across calls so title and description sources can merge.
pub fn extract_keywords(section: &str, map: &mut KeywordMap) -> Vec<ParseWarning> {
    let mut warnings = Vec::new();

    let matches: Vec<(std::ops::Range<usize>, usize)> = KEYWORD_TOKEN
        .captures_iter(section)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let token = caps.get(1)?;
            Some((token.range(), whole.start()))
        })
        .collect();

    for (index, (token_range, _)) in matches.iter().enumerate() {
        let raw_token = &section[token_range.clone()];
        let token = raw_token.replace(ZERO_WIDTH_SPACE, "");
        let Ok(name) = KeywordName::parse(token.trim()) else {
            continue;
        };

        let tail_end = matches
            .get(index + 1)
            .map_or(section.len(), |(_, next_anchor)| *next_anchor);
        let tail = section[token_range.end..tail_end]
            .trim_matches(ZERO_WIDTH_SPACE)
            .trim();

        let records = map.entry(name.into_string()).or_default();
        if let Some(rest) = tail.strip_prefix('=')
            && !rest.trim().is_empty()
        {
            let (record, mut record_warnings) = parse_parameters(rest);
            records.push(record);
            warnings.append(&mut record_warnings);
        }
    }

    warnings
}
