//! `[content]` section configuration.
//!
//! Describes where posts live and which files count as posts.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `[content]` section in relink.toml - location of the Markdown posts.
///
/// # Example
/// ```toml
/// [content]
/// dir = "_posts"
/// extensions = ["md", "markdown"]
/// ignore = ["drafts"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    /// Content root, relative to the project root.
    #[serde(default = "defaults::content::dir")]
    #[educe(Default = defaults::content::dir())]
    pub dir: PathBuf,

    /// File extensions treated as posts (without the leading dot).
    #[serde(default = "defaults::content::extensions")]
    #[educe(Default = defaults::content::extensions())]
    pub extensions: Vec<String>,

    /// File or directory names skipped while walking the content root.
    #[serde(default = "defaults::content::ignore")]
    #[educe(Default = defaults::content::ignore())]
    pub ignore: Vec<String>,
}

impl ContentConfig {
    /// Whether `path` has one of the configured post extensions.
    ///
    /// Comparison is ASCII case-insensitive, so `Post.MD` counts.
    pub fn is_post(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Whether a walk entry with this file name should be skipped.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|i| i == name)
    }
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use super::*;

    #[test]
    fn test_content_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.content.dir, PathBuf::from("_posts"));
        assert_eq!(config.content.extensions, vec!["md", "markdown"]);
        assert!(config.content.ignore.is_empty());
    }

    #[test]
    fn test_content_config_full() {
        let config = r#"
            [content]
            dir = "notes/posts"
            extensions = ["md"]
            ignore = ["drafts", "README.md"]
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.content.dir, PathBuf::from("notes/posts"));
        assert_eq!(config.content.extensions, vec!["md"]);
        assert!(config.content.is_ignored("drafts"));
        assert!(config.content.is_ignored("README.md"));
        assert!(!config.content.is_ignored("2024-01-01-hello.md"));
    }

    #[test]
    fn test_content_config_unknown_field() {
        let config = r#"
            [content]
            directory = "posts"
        "#;
        assert!(toml::from_str::<SiteConfig>(config).is_err());
    }

    #[test]
    fn test_is_post() {
        let content = ContentConfig::default();

        assert!(content.is_post(Path::new("_posts/2024-01-01-hello.md")));
        assert!(content.is_post(Path::new("_posts/Hello.MD")));
        assert!(content.is_post(Path::new("notes.markdown")));
        assert!(!content.is_post(Path::new("assets/foo.png")));
        assert!(!content.is_post(Path::new("Makefile")));
    }
}
