//! Integration tests for the Keymark pipeline.
//!
//! These verify the end-to-end flow from raw metadata text through the
//! tokenizer, splitter, classifier, and store population.

use km_core::AppGraph;
use km_parser::{clean_up_keywords, get_keywords};
use km_store::{TextSource, build_store};

fn sample_graph() -> AppGraph {
    serde_json::from_str(
        r#"{
            "scenes": [
                {
                    "key": "scene_1",
                    "slug": "orders",
                    "views": [
                        {
                            "key": "view_1",
                            "type": "table",
                            "title": "Orders _hv _dr=25",
                            "description": "Open orders _hc=[Status],[ktlRoles, Admin, Manager]"
                        },
                        {
                            "key": "view_2",
                            "type": "rich_text",
                            "content": "<p>Dashboard</p><p>_zoom=120</p>"
                        },
                        {
                            "key": "view_3",
                            "type": "report",
                            "rows": [
                                {
                                    "reports": [
                                        { "description": "Totals _hc=[Average]" }
                                    ]
                                }
                            ]
                        }
                    ]
                }
            ],
            "objects": [
                {
                    "key": "object_1",
                    "fields": [
                        { "key": "field_9", "description": "_cfv=[field_9,eq,1]" }
                    ]
                }
            ]
        }"#,
    )
    .expect("sample graph JSON")
}

/// A full store build covers views, rich text, report cells, and fields.
#[test]
fn store_build_covers_every_entity_kind() {
    let build = build_store(&sample_graph());
    let store = &build.store;

    // Plain view: title and description merged under the view key.
    assert!(store.has("view_1", "_hv"));
    assert_eq!(store.records("view_1", "_dr")[0].params, vec![vec!["25".to_string()]]);
    let hc = &store.records("view_1", "_hc")[0];
    assert_eq!(hc.params, vec![vec!["Status".to_string()]]);
    assert_eq!(
        hc.options.as_ref().unwrap().get(km_core::OptionKey::Roles),
        Some("Admin, Manager")
    );

    // Rich text: keywords from content, promoted to scene scope (_zoom).
    assert!(store.has("view_2", "_zoom"));
    assert!(store.has("scene_1", "_zoom"));

    // Report cell: mirrored composite keys.
    assert_eq!(
        store.records("view_3_r0_c0", "_hc"),
        store.records("view_3_c0_r0", "_hc")
    );
    assert_eq!(store.records("view_3_r0_c0", "_hc").len(), 1);

    // Field meta description.
    assert_eq!(
        store.records("field_9", "_cfv")[0].params,
        vec![vec![
            "field_9".to_string(),
            "eq".to_string(),
            "1".to_string()
        ]]
    );
}

/// Display rewrites strip the keyword syntax the host should not show.
#[test]
fn store_build_emits_display_rewrites() {
    let build = build_store(&sample_graph());

    let title = build
        .rewrites
        .iter()
        .find(|rewrite| rewrite.entity == "view_1" && rewrite.source == TextSource::Title)
        .expect("title rewrite");
    assert_eq!(title.cleaned, "Orders");

    let content = build
        .rewrites
        .iter()
        .find(|rewrite| rewrite.entity == "view_2")
        .expect("content rewrite");
    assert_eq!(content.source, TextSource::Content);
    assert_eq!(content.cleaned, "Dashboard");
}

/// The store serializes to JSON and back without loss.
#[test]
fn store_round_trips_through_json() {
    let build = build_store(&sample_graph());
    let encoded = serde_json::to_string_pretty(&build.store).expect("serialize");
    let decoded: km_store::KeywordStore = serde_json::from_str(&encoded).expect("deserialize");
    assert_eq!(decoded, build.store);
}

/// Parsing and cleanup agree: what cleanup removes is exactly what the
/// keyword map contains.
#[test]
fn cleanup_and_parse_are_consistent() {
    let title = "Orders _hv _dr=25";
    assert_eq!(clean_up_keywords(title), "Orders");

    let map = get_keywords(title);
    assert_eq!(map.len(), 2);
    assert!(get_keywords(&clean_up_keywords(title)).is_empty());
}

/// Lookups never fail: unknown entities and keywords return empty slices.
#[test]
fn lookups_degrade_to_empty() {
    let build = build_store(&sample_graph());
    assert!(build.store.records("view_404", "_dr").is_empty());
    assert!(build.store.records("view_1", "_nope").is_empty());
    assert!(build.store.records("view_1", "not-a-keyword").is_empty());
}
