//! `[rewrite]` section configuration.
//!
//! Controls the exact shape of both reference forms.

use super::{ConfigError, defaults};
use educe::Educe;
use serde::{Deserialize, Serialize};

/// Quote character used around the asset path in the publishing form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// `{{ '/assets/foo.png' | absolute_url }}` (default).
    #[default]
    Single,
    /// `{{ "/assets/foo.png" | absolute_url }}`.
    Double,
}

impl QuoteStyle {
    pub const fn as_char(self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
        }
    }
}

/// `[rewrite]` section in relink.toml.
///
/// # Example
/// ```toml
/// [rewrite]
/// assets_dir = "assets"
/// filter = "absolute_url"
/// quote = "single"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RewriteConfig {
    /// Assets directory name, shared by both forms
    /// (`./assets/x.png` and `'/assets/x.png'`).
    #[serde(default = "defaults::rewrite::assets_dir")]
    #[educe(Default = defaults::rewrite::assets_dir())]
    pub assets_dir: String,

    /// Liquid filter that turns the path into a site URL,
    /// e.g. `absolute_url` or `relative_url`.
    #[serde(default = "defaults::rewrite::filter")]
    #[educe(Default = defaults::rewrite::filter())]
    pub filter: String,

    #[serde(default = "defaults::rewrite::quote")]
    #[educe(Default = defaults::rewrite::quote())]
    pub quote: QuoteStyle,
}

/// Characters allowed in a single path segment or filter name.
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

impl RewriteConfig {
    /// Check that `assets_dir` and `filter` can be embedded into the
    /// reference patterns unambiguously.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filter.is_empty() || !self.filter.chars().all(is_name_char) {
            return Err(ConfigError::invalid(
                "rewrite.filter",
                format!("must be a non-empty name of [A-Za-z0-9_.-], got `{}`", self.filter),
            ));
        }

        let segments_ok = !self.assets_dir.is_empty()
            && self.assets_dir.split('/').all(|seg| {
                !seg.is_empty() && seg != "." && seg != ".." && seg.chars().all(is_name_char)
            });
        if !segments_ok {
            return Err(ConfigError::invalid(
                "rewrite.assets_dir",
                format!("must be a relative path of [A-Za-z0-9_.-] segments, got `{}`", self.assets_dir),
            ));
        }

        Ok(())
    }
}
