//! The pure scan stage: walk the metadata graph, extract keywords from every
//! text source, and collect the display-text rewrites. No policy decisions
//! happen here; that keeps the grammar testable in isolation.

use std::collections::BTreeMap;

use km_core::{
    AppGraph, Field, KeywordMap, ParseWarning, View, report_cell_key_col_major,
    report_cell_key_row_major,
};
use km_parser::{
    clean_up_content, clean_up_keywords, get_keywords_from_content_into, get_keywords_into,
    keyword_start_index, normalize_field_description,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which text field of an entity a rewrite applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    Title,
    Description,
    Content,
}

/// A display-text rewrite the host should apply: the entity's text with the
/// raw keyword syntax stripped. Emitted only when the text actually carried
/// keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRewrite {
    pub entity: String,
    pub source: TextSource,
    pub cleaned: String,
}

/// Result of scanning a metadata graph: per-entity keyword maps, pending
/// display rewrites, and accumulated parse warnings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppScan {
    pub entities: BTreeMap<String, KeywordMap>,
    pub rewrites: Vec<TextRewrite>,
    pub warnings: Vec<ParseWarning>,
}

impl AppScan {
    fn store(&mut self, key: String, map: KeywordMap) {
        // Empty keyword sets are never stored.
        if !map.is_empty() {
            self.entities.insert(key, map);
        }
    }
}

/// Walk every view of every scene and every field of every object, once,
/// synchronously. The scan is deterministic and side-effect free.
#[must_use]
pub fn scan_app(graph: &AppGraph) -> AppScan {
    let mut scan = AppScan::default();

    for scene in &graph.scenes {
        for view in &scene.views {
            scan_view(view, &mut scan);
        }
    }
    for object in &graph.objects {
        for field in &object.fields {
            scan_field(field, &mut scan);
        }
    }

    debug!(
        entities = scan.entities.len(),
        rewrites = scan.rewrites.len(),
        warnings = scan.warnings.len(),
        "scanned application graph"
    );
    scan
}

fn scan_view(view: &View, scan: &mut AppScan) {
    if view.view_type == "rich_text" {
        scan_rich_text_view(view, scan);
        return;
    }

    let mut map = KeywordMap::new();
    scan_text(
        &view.title,
        &view.key,
        TextSource::Title,
        &mut map,
        scan,
    );
    scan_text(
        &view.description,
        &view.key,
        TextSource::Description,
        &mut map,
        scan,
    );
    scan.store(view.key.clone(), map);

    if view.view_type == "report" {
        scan_report_cells(view, scan);
    }
}

fn scan_text(
    text: &str,
    entity: &str,
    source: TextSource,
    map: &mut KeywordMap,
    scan: &mut AppScan,
) {
    if text.is_empty() || keyword_start_index(text).is_none() {
        return;
    }
    let mut warnings = get_keywords_into(text, map);
    scan.warnings.append(&mut warnings);
    scan.rewrites.push(TextRewrite {
        entity: entity.to_string(),
        source,
        cleaned: clean_up_keywords(text),
    });
}

fn scan_rich_text_view(view: &View, scan: &mut AppScan) {
    if view.content.is_empty() {
        return;
    }
    let mut map = KeywordMap::new();
    let mut warnings = get_keywords_from_content_into(&view.content, &mut map);
    scan.warnings.append(&mut warnings);
    if map.is_empty() {
        return;
    }
    scan.rewrites.push(TextRewrite {
        entity: view.key.clone(),
        source: TextSource::Content,
        cleaned: clean_up_content(&view.content),
    });
    scan.store(view.key.clone(), map);
}

/// Each report cell's description is scanned independently and stored under
/// both mirrored composite keys, so consumers can address a cell row-major
/// or column-major.
fn scan_report_cells(view: &View, scan: &mut AppScan) {
    for (row, report_row) in view.rows.iter().enumerate() {
        for (col, cell) in report_row.reports.iter().enumerate() {
            scan_report_cell(&cell.description, &view.key, row, col, scan);
        }
    }
    for (col, report_col) in view.columns.iter().enumerate() {
        for (row, cell) in report_col.reports.iter().enumerate() {
            scan_report_cell(&cell.description, &view.key, row, col, scan);
        }
    }
}

fn scan_report_cell(description: &str, view_key: &str, row: usize, col: usize, scan: &mut AppScan) {
    if description.is_empty() {
        return;
    }
    let mut map = KeywordMap::new();
    let mut warnings = get_keywords_into(description, &mut map);
    scan.warnings.append(&mut warnings);
    if map.is_empty() {
        return;
    }
    let row_major = report_cell_key_row_major(view_key, row, col);
    scan.rewrites.push(TextRewrite {
        entity: row_major.clone(),
        source: TextSource::Description,
        cleaned: clean_up_keywords(description),
    });
    scan.entities
        .insert(report_cell_key_col_major(view_key, col, row), map.clone());
    scan.entities.insert(row_major, map);
}

fn scan_field(field: &Field, scan: &mut AppScan) {
    if field.description.is_empty() {
        return;
    }
    let normalized = normalize_field_description(&field.description);
    let mut map = KeywordMap::new();
    let mut warnings = get_keywords_into(&normalized, &mut map);
    scan.warnings.append(&mut warnings);
    scan.store(field.key.clone(), map);
}

#[cfg(test)]
mod tests {
    use super::*;
    use km_core::{ObjectDef, ReportCell, ReportRow, Scene};

    fn graph_with_view(view: View) -> AppGraph {
        AppGraph {
            scenes: vec![Scene {
                key: "scene_1".to_string(),
                slug: "home".to_string(),
                views: vec![view],
            }],
            objects: Vec::new(),
        }
    }

    #[test]
    fn title_and_description_merge_into_one_entity_map() {
        let scan = scan_app(&graph_with_view(View {
            key: "view_1".to_string(),
            title: "Orders _hv".to_string(),
            description: "All open orders _dr=25".to_string(),
            ..View::default()
        }));

        let map = &scan.entities["view_1"];
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("_hv"));
        assert_eq!(map["_dr"][0].params, vec![vec!["25".to_string()]]);

        assert_eq!(scan.rewrites.len(), 2);
        assert_eq!(scan.rewrites[0].source, TextSource::Title);
        assert_eq!(scan.rewrites[0].cleaned, "Orders");
        assert_eq!(scan.rewrites[1].source, TextSource::Description);
        assert_eq!(scan.rewrites[1].cleaned, "All open orders");
    }

    #[test]
    fn keyword_free_views_are_not_stored() {
        let scan = scan_app(&graph_with_view(View {
            key: "view_1".to_string(),
            title: "Orders".to_string(),
            ..View::default()
        }));
        assert!(scan.entities.is_empty());
        assert!(scan.rewrites.is_empty());
    }

    #[test]
    fn rich_text_views_scan_content() {
        let scan = scan_app(&graph_with_view(View {
            key: "view_2".to_string(),
            view_type: "rich_text".to_string(),
            content: "<p>Welcome</p><p>_zoom=120</p>".to_string(),
            ..View::default()
        }));

        let map = &scan.entities["view_2"];
        assert_eq!(map["_zoom"][0].params, vec![vec!["120".to_string()]]);
        assert_eq!(scan.rewrites[0].source, TextSource::Content);
        assert_eq!(scan.rewrites[0].cleaned, "Welcome");
    }

    #[test]
    fn report_cells_store_under_mirrored_keys() {
        let scan = scan_app(&graph_with_view(View {
            key: "view_3".to_string(),
            view_type: "report".to_string(),
            rows: vec![ReportRow {
                reports: vec![
                    ReportCell {
                        description: String::new(),
                    },
                    ReportCell {
                        description: "Totals _hc=[Average]".to_string(),
                    },
                ],
            }],
            ..View::default()
        }));

        let row_major = &scan.entities["view_3_r0_c1"];
        let col_major = &scan.entities["view_3_c1_r0"];
        assert_eq!(row_major, col_major);
        assert_eq!(
            row_major["_hc"][0].params,
            vec![vec!["Average".to_string()]]
        );
        assert_eq!(scan.rewrites[0].cleaned, "Totals");
    }

    #[test]
    fn fields_scan_normalized_meta_descriptions() {
        let graph = AppGraph {
            scenes: Vec::new(),
            objects: vec![ObjectDef {
                key: "object_1".to_string(),
                fields: vec![Field {
                    key: "field_7".to_string(),
                    description: "<span>_uc</span>\n<em>notes</em>".to_string(),
                }],
            }],
        };
        let scan = scan_app(&graph);
        assert!(scan.entities["field_7"].contains_key("_uc"));
    }

    #[test]
    fn warnings_bubble_up_from_parameter_parsing() {
        let scan = scan_app(&graph_with_view(View {
            key: "view_4".to_string(),
            title: "Orders _hc=[A],[ktlMsg]".to_string(),
            ..View::default()
        }));
        assert_eq!(scan.warnings.len(), 1);
        assert_eq!(
            scan.warnings[0].code.as_str(),
            "keymark/warn/malformed-option"
        );
    }
}
