#![forbid(unsafe_code)]

//! The Keymark grammar: inline keyword markup embedded in prose.
//!
//! Pipeline, leaf to root:
//!
//! ```text
//! raw text (title / description / rich content)
//!     ↓ tokenizer     - find the prose/keyword boundary
//!     ↓ splitter      - keyword name → raw parameter tails
//!     ↓ group parser  - one tail → bracket-delimited groups
//!     ↓ classifier    - group → positional params or reserved option
//! KeywordMap (name → ParsedKeyword declarations, in order)
//! ```
//!
//! The whole pipeline is total: malformed input degrades to best-effort
//! results plus [`km_core::ParseWarning`]s, never an error. That
//! permissiveness is a compatibility contract with the grammar this engine
//! implements, where authors type keywords free-hand into text fields.

mod html;
mod params;
mod splitter;
mod tokenizer;

pub use html::{decode_entities, normalize_content, normalize_field_description};
pub use params::{classify_group, parse_param_groups, parse_parameters};
pub use splitter::extract_keywords;
pub use tokenizer::{
    clean_up_content, clean_up_keywords, get_keywords, get_keywords_from_content,
    get_keywords_from_content_into, get_keywords_into, keyword_start_index,
};
