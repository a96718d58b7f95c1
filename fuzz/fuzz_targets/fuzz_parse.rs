#![no_main]

use km_core::KeywordMap;
use km_parser::{get_keywords, get_keywords_from_content, parse_parameters};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let map = get_keywords(text);
        let encoded = serde_json::to_string(&map).expect("keyword map serializes");
        let decoded: KeywordMap = serde_json::from_str(&encoded).expect("keyword map round-trips");
        assert_eq!(decoded, map);

        let _ = get_keywords_from_content(text);
        let (record, _warnings) = parse_parameters(text);
        assert!(record.param_str.starts_with('['));
    }
});
