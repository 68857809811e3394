//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// [content] Section Defaults
// ============================================================================

pub mod content {
    use std::path::PathBuf;

    pub fn dir() -> PathBuf {
        "_posts".into()
    }

    pub fn extensions() -> Vec<String> {
        vec!["md".into(), "markdown".into()]
    }

    pub fn ignore() -> Vec<String> {
        vec![]
    }
}

// ============================================================================
// [rewrite] Section Defaults
// ============================================================================

pub mod rewrite {
    use super::super::QuoteStyle;

    pub fn assets_dir() -> String {
        "assets".into()
    }

    pub fn filter() -> String {
        "absolute_url".into()
    }

    pub fn quote() -> QuoteStyle {
        QuoteStyle::default()
    }
}
