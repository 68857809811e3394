//! Project configuration management for `relink.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                            |
//! |-------------|----------------------------------------------------|
//! | `[content]` | Where posts live and which files count as posts    |
//! | `[rewrite]` | Assets directory, Liquid filter and quote style    |
//!
//! The file is optional: without it every field takes its default and
//! `_posts/` under the current directory is rewritten.
//!
//! # Example
//!
//! ```toml
//! [content]
//! dir = "_posts"
//!
//! [rewrite]
//! assets_dir = "assets"
//! filter = "absolute_url"
//! ```

mod content;
pub mod defaults;
mod error;
mod rewrite;

pub use content::ContentConfig;
pub use error::ConfigError;
pub use rewrite::{QuoteStyle, RewriteConfig};

use crate::{cli::Cli, log};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing relink.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute project root (set after loading)
    #[serde(skip)]
    #[educe(Default = PathBuf::from("./"))]
    pub root: PathBuf,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Content location
    #[serde(default)]
    pub content: ContentConfig,

    /// Reference shapes
    #[serde(default)]
    pub rewrite: RewriteConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load `relink.toml` (or `cli.config`) from the project root, falling
    /// back to defaults when the file does not exist, then apply CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = Self::expand_root(cli.root.as_deref());
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;

        if config.config_path.exists() {
            log!("config"; "using {}", config.config_path.display());
        }
        Ok(config)
    }

    /// Content root as an absolute path
    pub fn content_dir(&self) -> &Path {
        &self.content.dir
    }

    /// Assets directory on disk, used to look up referenced files
    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(&self.rewrite.assets_dir)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = Self::expand_root(cli.root.as_deref());
        Self::update_option(&mut self.content.dir, cli.content.as_ref());

        self.root = Self::normalize_path(&root);
        self.config_path = Self::normalize_path(&self.root.join(&cli.config));
        self.content.dir = Self::normalize_path(&self.root.join(&self.content.dir));
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Expand a leading `~` in the root given on the command line
    fn expand_root(root: Option<&Path>) -> PathBuf {
        match root {
            Some(root) => PathBuf::from(shellexpand::tilde(&root.to_string_lossy()).into_owned()),
            None => PathBuf::from("./"),
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.content.extensions.is_empty() {
            bail!(ConfigError::invalid("content.extensions", "must have at least one element"));
        }

        if let Some(ext) = self.content.extensions.iter().find(|e| e.is_empty() || e.starts_with('.')) {
            bail!(ConfigError::invalid(
                "content.extensions",
                format!("entries are written without a leading dot, got `{ext}`")
            ));
        }

        self.rewrite.validate()?;

        Ok(())
    }
}
