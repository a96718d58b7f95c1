#![forbid(unsafe_code)]

//! Shared data model for the Keymark keyword engine.
//!
//! A "keyword" is an inline annotation embedded in human-authored metadata
//! text (`_hc=[Column A],[Column B]`). This crate defines the parsed record
//! types, the reserved option vocabulary, and the application metadata graph
//! that the scanner walks. The grammar itself lives in `km-parser`.

mod graph;

pub use graph::{
    AppGraph, Field, ObjectDef, ReportCell, ReportRow, Scene, View, report_cell_key_col_major,
    report_cell_key_row_major,
};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Zero-width space, stripped from keyword tokens before validation.
/// Copy/paste from rich-text editors tends to smuggle it in.
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Mapping from lower-cased keyword name to its declarations, in order.
///
/// A keyword may legitimately appear more than once in the same text
/// (conditional-formatting rules stack, for example), so the value is a list
/// and entries are never overwritten.
pub type KeywordMap = BTreeMap<String, Vec<ParsedKeyword>>;

/// A validated keyword name: `_` followed by at least two word characters,
/// the first of which is alphanumeric. Stored lower-cased; matching in
/// source text is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordName(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeywordNameError {
    #[error("keyword name must start with '_'")]
    MissingUnderscore,
    #[error("keyword name needs at least two characters after '_'")]
    TooShort,
    #[error("keyword name must not start with a second '_'")]
    DoubleUnderscore,
    #[error("keyword name contains invalid character '{found}'")]
    InvalidCharacter { found: char },
}

impl KeywordName {
    /// Validate and normalize a raw token.
    ///
    /// Rules: leading `_`, at least two following characters, the first of
    /// them alphanumeric (a second `_` escapes the token entirely), the rest
    /// word-class (`[A-Za-z0-9_]`). The result is lower-cased.
    pub fn parse(token: &str) -> Result<Self, KeywordNameError> {
        let Some(rest) = token.strip_prefix('_') else {
            return Err(KeywordNameError::MissingUnderscore);
        };
        let mut chars = rest.chars();
        let Some(first) = chars.next() else {
            return Err(KeywordNameError::TooShort);
        };
        if first == '_' {
            return Err(KeywordNameError::DoubleUnderscore);
        }
        if !first.is_ascii_alphanumeric() {
            return Err(KeywordNameError::InvalidCharacter { found: first });
        }
        let mut count = 1;
        for c in chars {
            if !c.is_ascii_alphanumeric() && c != '_' {
                return Err(KeywordNameError::InvalidCharacter { found: c });
            }
            count += 1;
        }
        if count < 2 {
            return Err(KeywordNameError::TooShort);
        }
        Ok(Self(token.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for KeywordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of reserved option names.
///
/// A parameter group whose first comma-separated token exactly (and
/// case-sensitively) equals one of these wire tokens is an option setting,
/// not a positional parameter. The set is deliberately a single enum so the
/// grammar stays centrally auditable.
///
/// Known ambiguity, preserved for compatibility: a positional value whose
/// first token happens to be a literal reserved name is indistinguishable
/// from an option declaration and will be classified as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKey {
    /// `ktlRoles` - restrict the keyword to the listed user roles.
    Roles,
    /// `ktlRefVal` - reference value forwarded to the consumer.
    RefVal,
    /// `ktlTarget` - selector/target the consumer should act on.
    Target,
    /// `ktlCond` - condition clause gating the keyword.
    Cond,
    /// `ktlMsg` - message text shown by the consumer.
    Msg,
}

impl OptionKey {
    pub const ALL: [Self; 5] = [Self::Roles, Self::RefVal, Self::Target, Self::Cond, Self::Msg];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Roles => "ktlRoles",
            Self::RefVal => "ktlRefVal",
            Self::Target => "ktlTarget",
            Self::Cond => "ktlCond",
            Self::Msg => "ktlMsg",
        }
    }

    /// Exact, case-sensitive match against the reserved wire tokens.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == token)
    }
}

/// Recognized option settings attached to one keyword declaration.
///
/// Field names on the wire are the reserved tokens themselves, so serialized
/// records read the same way the source text does.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeywordOptions {
    #[serde(rename = "ktlRoles", default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<String>,
    #[serde(rename = "ktlRefVal", default, skip_serializing_if = "Option::is_none")]
    pub ref_val: Option<String>,
    #[serde(rename = "ktlTarget", default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(rename = "ktlCond", default, skip_serializing_if = "Option::is_none")]
    pub cond: Option<String>,
    #[serde(rename = "ktlMsg", default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl KeywordOptions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        OptionKey::ALL.into_iter().all(|key| self.get(key).is_none())
    }

    #[must_use]
    pub fn get(&self, key: OptionKey) -> Option<&str> {
        match key {
            OptionKey::Roles => self.roles.as_deref(),
            OptionKey::RefVal => self.ref_val.as_deref(),
            OptionKey::Target => self.target.as_deref(),
            OptionKey::Cond => self.cond.as_deref(),
            OptionKey::Msg => self.msg.as_deref(),
        }
    }

    /// Set an option value. Repeated declarations of the same option in one
    /// keyword overwrite; the last one wins.
    pub fn set(&mut self, key: OptionKey, value: String) {
        let slot = match key {
            OptionKey::Roles => &mut self.roles,
            OptionKey::RefVal => &mut self.ref_val,
            OptionKey::Target => &mut self.target,
            OptionKey::Cond => &mut self.cond,
            OptionKey::Msg => &mut self.msg,
        };
        *slot = Some(value);
    }
}

/// One parsed keyword declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedKeyword {
    /// Positional parameter groups, each split on commas and trimmed.
    /// Groups classified as options are excluded.
    pub params: Vec<Vec<String>>,
    /// The bracket-normalized source string, kept for diagnostics.
    #[serde(rename = "paramStr")]
    pub param_str: String,
    /// Present only when at least one option group was classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<KeywordOptions>,
}

/// Classification of a single parameter group.
///
/// The grammar is permissive: nothing here is an error. `Malformed` marks a
/// group that names a reserved option but supplies no value; callers decide
/// whether to log, drop, or reject it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupOutcome {
    /// An ordinary positional parameter group.
    Params(Vec<String>),
    /// A reserved option with its raw trailing value.
    OptionSetting { key: OptionKey, value: String },
    /// A reserved option name with no value after it.
    Malformed { raw: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseWarningCode {
    #[default]
    MalformedOption,
}

impl ParseWarningCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedOption => "keymark/warn/malformed-option",
        }
    }
}

/// Non-fatal diagnostic emitted while parsing. The pipeline never fails;
/// anything irregular degrades to a warning and a best-effort result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseWarning {
    pub code: ParseWarningCode,
    pub message: String,
}
