//! The policy pass: scope escalation and well-known registrations applied
//! over a finished scan. Kept separate from the scan so the grammar and the
//! platform policies stay independently testable.

use km_core::AppGraph;
use tracing::debug;

use crate::scan::AppScan;
use crate::{KeywordStore, StoreBuild};

/// Keywords that act at page scope even though they are declared on a view.
/// A view map containing any of these is additionally registered under the
/// owning scene's key.
pub const SCENE_SCOPE_KEYWORDS: [&str; 4] = ["_km", "_kbs", "_zoom", "_nswd"];

/// Marks the view whose page provides the application footer.
pub const FOOTER_KEYWORD: &str = "_footer";

/// "Log out here": marks the page users should land on before logging out.
pub const LOGOUT_KEYWORD: &str = "_loh";

/// Apply scope-escalation and well-known-key policies to a scan result,
/// producing the frozen store.
///
/// - Scene promotion: view-declared page-scope keywords are merged under the
///   scene key as well, preserving declaration order per keyword.
/// - `_footer` / `_loh` record the owning scene's slug in the store's
///   dedicated slots. First declaration wins; acting on the slug (footer
///   injection, logout redirect) is the host's business.
#[must_use]
pub fn apply_policies(scan: AppScan, graph: &AppGraph) -> StoreBuild {
    let AppScan {
        mut entities,
        rewrites,
        warnings,
    } = scan;

    let mut footer_slug: Option<String> = None;
    let mut logout_slug: Option<String> = None;

    for scene in &graph.scenes {
        for view in &scene.views {
            let Some(map) = entities.get(&view.key).cloned() else {
                continue;
            };

            if map
                .keys()
                .any(|name| SCENE_SCOPE_KEYWORDS.contains(&name.as_str()))
            {
                debug!(view = %view.key, scene = %scene.key, "promoting view keywords to scene scope");
                let scene_map = entities.entry(scene.key.clone()).or_default();
                for (name, records) in &map {
                    scene_map
                        .entry(name.clone())
                        .or_default()
                        .extend(records.iter().cloned());
                }
            }

            if map.contains_key(FOOTER_KEYWORD) && footer_slug.is_none() {
                footer_slug = Some(scene.slug.clone());
            }
            if map.contains_key(LOGOUT_KEYWORD) && logout_slug.is_none() {
                logout_slug = Some(scene.slug.clone());
            }
        }
    }

    StoreBuild {
        store: KeywordStore {
            entities,
            footer_slug,
            logout_slug,
        },
        rewrites,
        warnings,
    }
}
