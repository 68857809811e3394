//! Per-file rewrite errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to process a single post.
///
/// A reference that matches neither form is not an error; it is left as-is.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// Missing, unreadable, or not valid UTF-8.
    #[error("cannot read `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("cannot write `{0}`")]
    Write(PathBuf, #[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_rewrite_error_display() {
        let err = RewriteError::Read(
            PathBuf::from("_posts/a.md"),
            Error::new(ErrorKind::PermissionDenied, "permission denied"),
        );
        assert_eq!(format!("{err}"), "cannot read `_posts/a.md`");
        assert!(err.source().is_some());

        let err = RewriteError::Write(
            PathBuf::from("_posts/b.md"),
            Error::new(ErrorKind::Other, "disk full"),
        );
        assert!(format!("{err:#}").contains("_posts/b.md"));
    }
}
