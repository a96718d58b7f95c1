#![forbid(unsafe_code)]

//! Keyword store population: parse-then-freeze.
//!
//! [`build_store`] makes a single synchronous pass over an application's
//! metadata graph and returns an immutable [`KeywordStore`]. There is no
//! mutation API afterward: population completes before any consumer reads,
//! and concurrent readers need no synchronization.
//!
//! Population is split into two explicit stages:
//! - [`scan_app`] - pure grammar: entity key → keyword map, plus the
//!   display-text rewrites and parse warnings,
//! - [`apply_policies`] - platform policy: scene-scope promotion and the
//!   footer/logout well-known registrations.

mod policy;
mod scan;

pub use policy::{FOOTER_KEYWORD, LOGOUT_KEYWORD, SCENE_SCOPE_KEYWORDS, apply_policies};
pub use scan::{AppScan, TextRewrite, TextSource, scan_app};

use std::collections::BTreeMap;

use km_core::{AppGraph, KeywordMap, ParseWarning, ParsedKeyword};
use serde::{Deserialize, Serialize};

/// The frozen keyword store: entity key → keyword map, plus the two
/// well-known page slugs. Built once per page session; read-only afterward.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeywordStore {
    entities: BTreeMap<String, KeywordMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    footer_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    logout_slug: Option<String>,
}

impl KeywordStore {
    /// All parsed declarations of `name` on `entity`, in declaration order.
    /// Empty when the entity or the keyword is absent. This is the lookup
    /// surface consumers are expected to use.
    #[must_use]
    pub fn records(&self, entity: &str, name: &str) -> &[ParsedKeyword] {
        let lowered = name.to_ascii_lowercase();
        self.entities
            .get(entity)
            .and_then(|map| map.get(&lowered))
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has(&self, entity: &str, name: &str) -> bool {
        let lowered = name.to_ascii_lowercase();
        self.entities
            .get(entity)
            .is_some_and(|map| map.contains_key(&lowered))
    }

    /// The full keyword map for one entity, if it declared any keywords.
    #[must_use]
    pub fn entity(&self, key: &str) -> Option<&KeywordMap> {
        self.entities.get(key)
    }

    /// Iterate all entity keys that carry keywords.
    pub fn entity_keys(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Page slug registered by a `_footer` declaration, if any.
    #[must_use]
    pub fn footer_slug(&self) -> Option<&str> {
        self.footer_slug.as_deref()
    }

    /// Page slug registered by a `_loh` declaration, if any.
    #[must_use]
    pub fn logout_slug(&self) -> Option<&str> {
        self.logout_slug.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Everything a store build produces: the store itself, the display-text
/// rewrites the host should apply, and accumulated parse warnings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreBuild {
    pub store: KeywordStore,
    pub rewrites: Vec<TextRewrite>,
    pub warnings: Vec<ParseWarning>,
}

/// Build the keyword store for one loaded application graph: scan, then
/// apply policies, then freeze.
#[must_use]
pub fn build_store(graph: &AppGraph) -> StoreBuild {
    apply_policies(scan_app(graph), graph)
}
