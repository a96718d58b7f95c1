//! Small HTML normalization helpers for keyword sources that arrive as
//! rich text. This is not an HTML parser; it only flattens the handful of
//! constructs the host's editor produces around keyword declarations.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static BREAK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</?p(?:\s[^>]*)?>").expect("break tag pattern"));

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#x?[0-9a-fA-F]+|[a-zA-Z]+);").expect("entity pattern"));

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("space run pattern"));

/// Decode the HTML entities the host editor emits around keyword text.
///
/// Named entities outside the known set are left untouched rather than
/// guessed at; numeric references (`&#62;`, `&#x3E;`) are decoded when they
/// map to a valid scalar value.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let body = &caps[1];
            let decoded = match body {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => decode_numeric_entity(body),
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn decode_numeric_entity(body: &str) -> Option<char> {
    let digits = body.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

/// Flatten rich-text content so keyword tokens become line-anchored.
///
/// `<br>` and `<p>`/`</p>` turn into line breaks (a keyword directly after
/// an opening `<p>` must still count as line-start), then entities are
/// decoded so declarations like `_cfv=[a,&gt;,1]` read back literally.
#[must_use]
pub fn normalize_content(html: &str) -> String {
    let broken = BREAK_TAG.replace_all(html, "\n");
    decode_entities(&broken)
}

/// Normalize a field's meta description: line breaks and tags become spaces,
/// entities are decoded, and runs of spaces collapse to one.
#[must_use]
pub fn normalize_field_description(text: &str) -> String {
    let flat = text.replace(['\r', '\n'], " ");
    let untagged = ANY_TAG.replace_all(&flat, " ");
    let decoded = decode_entities(&untagged);
    SPACE_RUN.replace_all(&decoded, " ").trim().to_string()
}
