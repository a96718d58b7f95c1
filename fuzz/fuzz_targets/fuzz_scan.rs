#![no_main]

use km_core::{AppGraph, Scene, View};
use km_store::build_store;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let graph = AppGraph {
            scenes: vec![Scene {
                key: "scene_1".to_string(),
                slug: "page".to_string(),
                views: vec![View {
                    key: "view_1".to_string(),
                    title: text.to_string(),
                    description: text.to_string(),
                    ..View::default()
                }],
            }],
            objects: Vec::new(),
        };
        let first = build_store(&graph);
        let second = build_store(&graph);
        assert_eq!(first, second);
    }
});
