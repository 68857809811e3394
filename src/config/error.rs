//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Why `relink.toml` could not be turned into a usable [`SiteConfig`].
///
/// [`SiteConfig`]: super::SiteConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    /// Syntax error or unknown key; the source carries line and column.
    #[error("config file is not valid relink TOML")]
    Toml(#[from] toml::de::Error),

    /// A well-formed value that relink cannot use.
    #[error("[{key}] {reason}")]
    Validation { key: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation { key, reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("relink.toml"),
            Error::new(ErrorKind::PermissionDenied, "permission denied"),
        );
        assert_eq!(format!("{io_err}"), "cannot read config file `relink.toml`");
        assert!(io_err.source().is_some());

        let err = ConfigError::invalid("rewrite.filter", "must not be empty");
        assert_eq!(format!("{err}"), "[rewrite.filter] must not be empty");
        assert!(matches!(err, ConfigError::Validation { key: "rewrite.filter", .. }));
    }

    #[test]
    fn test_toml_error_converts() {
        let err = toml::from_str::<toml::Value>("[content").unwrap_err();
        let err: ConfigError = err.into();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(err.source().is_some());
    }
}
