//! The application metadata graph the scanner walks.
//!
//! This mirrors the host platform's scene/view/object model, reduced to the
//! fields the keyword engine reads. Everything is tolerant of absence: hosts
//! routinely omit titles, descriptions, and report grids, so every field
//! defaults to empty.

use serde::{Deserialize, Serialize};

/// The full metadata graph for one loaded application page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppGraph {
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
}

/// A page ("scene") containing rendered views.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scene {
    pub key: String,
    /// URL slug of the page, referenced by page-level keyword policies.
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub views: Vec<View>,
}

/// A rendered view. Which text fields carry keywords depends on the type:
/// rich-text views declare them in `content`, report views additionally in
/// each report cell's description, everything else in `title` and
/// `description`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct View {
    pub key: String,
    #[serde(rename = "type", default)]
    pub view_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Rich-text HTML body, only meaningful for `rich_text` views.
    #[serde(default)]
    pub content: String,
    /// Report grid, row-major. Only meaningful for `report` views.
    #[serde(default)]
    pub rows: Vec<ReportRow>,
    /// Report grid, column-major.
    #[serde(default)]
    pub columns: Vec<ReportRow>,
}

/// One row (or column) of a report view's grid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(default)]
    pub reports: Vec<ReportCell>,
}

/// A single report cell with its own description text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportCell {
    #[serde(default)]
    pub description: String,
}

/// A data object with its fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectDef {
    pub key: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// An object field. `description` is the builder-side meta description,
/// which may contain HTML noise that gets normalized away before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    #[serde(default)]
    pub description: String,
}

/// Composite store key for a report cell, row-major
/// (`view_1_r0_c1` = row 0, column 1 of `view_1`).
#[must_use]
pub fn report_cell_key_row_major(view: &str, row: usize, col: usize) -> String {
    format!("{view}_r{row}_c{col}")
}

/// Composite store key for a report cell, column-major. Stored alongside the
/// row-major key so consumers can look up by either coordinate order.
#[must_use]
pub fn report_cell_key_col_major(view: &str, col: usize, row: usize) -> String {
    format!("{view}_c{col}_r{row}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_deserializes_with_absent_fields() {
        let graph: AppGraph = serde_json::from_str(
            r#"{
                "scenes": [
                    { "key": "scene_1", "views": [ { "key": "view_1" } ] }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(graph.scenes.len(), 1);
        assert_eq!(graph.scenes[0].slug, "");
        assert!(graph.objects.is_empty());

        let view = &graph.scenes[0].views[0];
        assert_eq!(view.key, "view_1");
        assert_eq!(view.view_type, "");
        assert!(view.title.is_empty());
        assert!(view.rows.is_empty());
    }

    #[test]
    fn view_type_maps_from_type_field() {
        let view: View =
            serde_json::from_str(r#"{ "key": "view_9", "type": "rich_text" }"#).unwrap();
        assert_eq!(view.view_type, "rich_text");
    }

    #[test]
    fn report_cell_keys_are_mirrored() {
        assert_eq!(report_cell_key_row_major("view_1", 0, 2), "view_1_r0_c2");
        assert_eq!(report_cell_key_col_major("view_1", 2, 0), "view_1_c2_r0");
    }
}
