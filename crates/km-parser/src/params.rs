//! Parameter-group parsing and param/option classification.
//!
//! A keyword's parameter text is a sequence of bracketed groups separated by
//! the literal `],[`. There is no escaping mechanism: a value cannot contain
//! a literal comma or `],[`. That is a compatibility contract with the
//! existing grammar, not an oversight; irregular input produces best-effort
//! groupings rather than an error.

use km_core::{GroupOutcome, KeywordOptions, OptionKey, ParseWarning, ParseWarningCode, ParsedKeyword};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Rich-text editors sometimes leave a closing anchor (and whatever follows
/// it) glued onto the parameter text. Everything from the first `</a>` on is
/// dropped before parsing.
static ANCHOR_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</a\s*>").expect("anchor pattern"));

static OPEN_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\s+").expect("open bracket pattern"));
static CLOSE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\]").expect("close bracket pattern"));
static SEP_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\]\s*,\s*\[").expect("separator pattern"));

/// Split a bracket-normalized parameter string into its ordered group
/// strings: `[A,B],[C]` yields `["A,B", "C"]`.
///
/// The caller guarantees the string starts with `[` (unbracketed shorthand
/// is wrapped by [`parse_parameters`] first). Whitespace just inside the
/// delimiters and around the separator is collapsed, so `[ a,b ] , [ c ]`
/// parses the same as `[a,b],[c]`.
#[must_use]
pub fn parse_param_groups(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let opened = OPEN_WS.replace_all(trimmed, "[");
    let closed = CLOSE_WS.replace_all(&opened, "]");
    let normalized = SEP_WS.replace_all(&closed, "],[");

    normalized
        .split("],[")
        .map(|fragment| {
            let fragment = fragment.strip_prefix('[').unwrap_or(fragment);
            let fragment = fragment.strip_suffix(']').unwrap_or(fragment);
            fragment.to_string()
        })
        .collect()
}

/// Classify one group string as positional parameters, an option setting,
/// or a malformed option (reserved name with nothing after it).
///
/// Option values keep their internal spacing: `ktlRoles, Admin, Manager`
/// yields the value `Admin, Manager`, not a re-joined token list.
#[must_use]
pub fn classify_group(group: &str) -> GroupOutcome {
    let (head, tail) = match group.split_once(',') {
        Some((head, tail)) => (head.trim(), Some(tail.trim())),
        None => (group.trim(), None),
    };

    let Some(key) = OptionKey::from_token(head) else {
        return GroupOutcome::Params(group.split(',').map(|token| token.trim().to_string()).collect());
    };

    match tail {
        Some(value) if !value.is_empty() => GroupOutcome::OptionSetting {
            key,
            value: value.to_string(),
        },
        _ => GroupOutcome::Malformed {
            raw: group.to_string(),
        },
    }
}

/// Parse one keyword's full parameter text into its structured record.
///
/// Steps: drop trailing anchor-tag artifacts, wrap unbracketed shorthand
/// (`5` becomes `[5]`), split into groups, classify each. Malformed option
/// groups are logged, returned as warnings, and dropped; everything else is
/// kept. This function never fails.
#[must_use]
pub fn parse_parameters(raw: &str) -> (ParsedKeyword, Vec<ParseWarning>) {
    let truncated = match ANCHOR_CLOSE.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    };
    let trimmed = truncated.trim();

    let wrapped = if trimmed.starts_with('[') {
        trimmed.to_string()
    } else {
        format!("[{trimmed}]")
    };

    let mut params = Vec::new();
    let mut options = KeywordOptions::default();
    let mut warnings = Vec::new();

    for group in parse_param_groups(&wrapped) {
        match classify_group(&group) {
            GroupOutcome::Params(tokens) => params.push(tokens),
            GroupOutcome::OptionSetting { key, value } => options.set(key, value),
            GroupOutcome::Malformed { raw } => {
                let message = format!("option group \"{raw}\" supplies no value; group dropped");
                warn!("{message}");
                warnings.push(ParseWarning {
                    code: ParseWarningCode::MalformedOption,
                    message,
                });
            }
        }
    }

    let record = ParsedKeyword {
        params,
        param_str: wrapped,
        options: (!options.is_empty()).then_some(options),
    };
    (record, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_split_on_literal_separator() {
        assert_eq!(parse_param_groups("[A,B],[C]"), vec!["A,B", "C"]);
        assert_eq!(parse_param_groups("[only]"), vec!["only"]);
    }

    #[test]
    fn groups_collapse_whitespace_inside_delimiters() {
        assert_eq!(
            parse_param_groups(" [ a,b ] , [ c ] "),
            parse_param_groups("[a,b],[c]")
        );
        assert_eq!(parse_param_groups(" [ a,b ] , [ c ] "), vec!["a,b", "c"]);
    }

    #[test]
    fn unbalanced_brackets_degrade_without_error() {
        // No validation by design; the split is tolerant of irregular input.
        assert_eq!(parse_param_groups("[a],[b"), vec!["a", "b"]);
        assert_eq!(parse_param_groups("[a],b]"), vec!["a],b"]);
    }

    #[test]
    fn classify_plain_group_as_params() {
        assert_eq!(
            classify_group("Column A"),
            GroupOutcome::Params(vec!["Column A".to_string()])
        );
        assert_eq!(
            classify_group("1, 2 ,3"),
            GroupOutcome::Params(vec!["1".to_string(), "2".to_string(), "3".to_string()])
        );
    }

    #[test]
    fn classify_option_keeps_internal_spacing() {
        assert_eq!(
            classify_group("ktlRoles, Admin, Manager"),
            GroupOutcome::OptionSetting {
                key: OptionKey::Roles,
                value: "Admin, Manager".to_string(),
            }
        );
    }

    #[test]
    fn classify_option_name_is_case_sensitive() {
        // A near-miss on the reserved token stays a positional group.
        assert_eq!(
            classify_group("ktlroles, Admin"),
            GroupOutcome::Params(vec!["ktlroles".to_string(), "Admin".to_string()])
        );
    }

    #[test]
    fn classify_valueless_option_as_malformed() {
        assert_eq!(
            classify_group("ktlTarget"),
            GroupOutcome::Malformed {
                raw: "ktlTarget".to_string()
            }
        );
        assert_eq!(
            classify_group("ktlTarget, "),
            GroupOutcome::Malformed {
                raw: "ktlTarget, ".to_string()
            }
        );
    }

    #[test]
    fn parse_parameters_wraps_shorthand() {
        let (record, warnings) = parse_parameters("25");
        assert_eq!(record.params, vec![vec!["25".to_string()]]);
        assert_eq!(record.param_str, "[25]");
        assert!(record.options.is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn parse_parameters_consumes_whole_group_as_option() {
        let (record, warnings) = parse_parameters("ktlRoles, Admin, Manager");
        assert!(record.params.is_empty());
        let options = record.options.unwrap();
        assert_eq!(options.get(OptionKey::Roles), Some("Admin, Manager"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn parse_parameters_mixes_params_and_options() {
        let (record, _) = parse_parameters("[Column A],[ktlCond, is, 5, field_1, My View]");
        assert_eq!(record.params, vec![vec!["Column A".to_string()]]);
        assert_eq!(
            record.options.unwrap().get(OptionKey::Cond),
            Some("is, 5, field_1, My View")
        );
    }

    #[test]
    fn parse_parameters_drops_malformed_option_with_warning() {
        let (record, warnings) = parse_parameters("[Column A],[ktlMsg]");
        assert_eq!(record.params, vec![vec!["Column A".to_string()]]);
        assert!(record.options.is_none());
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].code.as_str(),
            "keymark/warn/malformed-option"
        );
    }

    #[test]
    fn parse_parameters_truncates_anchor_artifacts() {
        let (record, _) = parse_parameters("[5]</a> trailing junk");
        assert_eq!(record.params, vec![vec!["5".to_string()]]);
        assert_eq!(record.param_str, "[5]");
    }

    #[test]
    fn parse_parameters_values_stay_strings() {
        let (record, _) = parse_parameters("[5],[06],[x]");
        assert_eq!(
            record.params,
            vec![
                vec!["5".to_string()],
                vec!["06".to_string()],
                vec!["x".to_string()]
            ]
        );
    }
}
