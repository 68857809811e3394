//! Regular expressions for the two reference forms.
//!
//! Every pattern exposes two named groups:
//!
//! - `url`: the exact byte range replaced when converting
//! - `name`: the asset file name below the assets directory
//!
//! Publishing-form patterns additionally capture the opening and closing
//! Liquid quotes (`lq1`, `lq2`) and HTML patterns the attribute quotes
//! (`hq1`, `hq2`), since the regex engine has no backreferences and a pair
//! only counts when both sides agree.

use crate::config::RewriteConfig;
use regex::Regex;

/// Asset file name: no whitespace, quotes, parentheses, angle brackets,
/// Liquid braces or pipes.
const NAME: &str = r#"[^\s"'()<>{}|\\]+"#;

/// Optional Markdown link title, kept verbatim.
const TITLE: &str = r#"(?:[ \t]+(?:"[^"\n]*"|'[^'\n]*'))?"#;

/// Alt text of a Markdown image.
const ALT: &str = r"!\[[^\]\n]*\]";

/// `<img ... src=` up to the attribute value.
const IMG_SRC: &str = r"<img\b[^>]*?\ssrc[ \t]*=[ \t]*";

/// Compiled patterns for one configuration.
#[derive(Debug, Clone)]
pub struct Patterns {
    pub markdown_authoring: Regex,
    pub markdown_publishing: Regex,
    pub html_authoring: Regex,
    pub html_publishing: Regex,
}

impl Patterns {
    pub fn new(config: &RewriteConfig) -> Result<Self, regex::Error> {
        let authoring = authoring_url(config);
        let publishing = publishing_url(config);

        Ok(Self {
            markdown_authoring: Regex::new(&format!(r"{ALT}\((?P<url>{authoring}){TITLE}\)"))?,
            markdown_publishing: Regex::new(&format!(r"{ALT}\((?P<url>{publishing}){TITLE}\)"))?,
            html_authoring: Regex::new(&format!(
                r#"{IMG_SRC}(?P<hq1>["'])(?P<url>{authoring})(?P<hq2>["'])"#
            ))?,
            html_publishing: Regex::new(&format!(
                r#"{IMG_SRC}(?P<hq1>["'])(?P<url>{publishing})(?P<hq2>["'])"#
            ))?,
        })
    }
}

/// `./assets/NAME`
fn authoring_url(config: &RewriteConfig) -> String {
    let assets = regex::escape(&config.assets_dir);
    format!(r"\./{assets}/(?P<name>{NAME})")
}

/// `{{ '/assets/NAME' | filter }}`, either quote, any inner spacing.
fn publishing_url(config: &RewriteConfig) -> String {
    let assets = regex::escape(&config.assets_dir);
    let filter = regex::escape(&config.filter);
    format!(
        r#"\{{\{{[ \t]*(?P<lq1>["'])/{assets}/(?P<name>{NAME})(?P<lq2>["'])[ \t]*\|[ \t]*{filter}[ \t]*\}}\}}"#
    )
}

/// Whether a captured name stays inside the assets directory.
///
/// Rejects absolute names, empty segments and `..` segments.
pub fn is_valid_name(name: &str) -> bool {
    !name.starts_with('/') && name.split('/').all(|seg| !seg.is_empty() && seg != "..")
}
