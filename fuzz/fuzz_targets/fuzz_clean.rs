#![no_main]

use km_parser::{clean_up_keywords, keyword_start_index};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let cleaned = clean_up_keywords(text);
        // Cleanup is idempotent and removes every keyword boundary.
        assert_eq!(clean_up_keywords(&cleaned), cleaned);
        assert_eq!(keyword_start_index(&cleaned), None);
    }
});
