//! Batch rewriting of a content directory.
//!
//! # Architecture
//!
//! ```text
//! rewrite_site()
//!     │
//!     ├── collect_posts()  ──► walk content root, keep post extensions
//!     │
//!     ├── rewrite_dir()    ──► par_iter over posts, one independent unit each
//!     │       │
//!     │       └── rewrite_file()  read → rewrite → write if changed
//!     │
//!     └── Summary::report()
//! ```
//!
//! # Failure policy
//!
//! Best effort. A post that cannot be read or written is recorded in the
//! [`Summary`] and the run carries on with the remaining posts; the command
//! fails at the end if anything was recorded. A missing content root aborts
//! before any file is touched.

use crate::{
    config::{ContentConfig, SiteConfig},
    log,
    rewrite::{Direction, RewriteError, Rewriter},
};
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

// ============================================================================
// Collecting Posts
// ============================================================================

/// Posts found under the content root.
#[derive(Debug, Default)]
pub struct Posts {
    /// Post files, sorted by path
    pub files: Vec<PathBuf>,
    /// Entries the walk could not descend into or stat
    pub unreadable: Vec<RewriteError>,
}

impl Posts {
    /// Number of entries found, readable or not.
    pub fn total(&self) -> usize {
        self.files.len() + self.unreadable.len()
    }
}

/// Recursively collect posts below `root`.
///
/// Hidden entries (`.git`, `.obsidian`, ...) and names listed in
/// `[content.ignore]` are skipped.
pub fn collect_posts(root: &Path, content: &ContentConfig) -> Result<Posts> {
    if !root.is_dir() {
        bail!("content directory `{}` not found", root.display());
    }

    let mut posts = Posts::default();
    let walk = WalkDir::new(root).into_iter().filter_entry(|e| {
        let name = e.file_name().to_str().unwrap_or_default();
        e.depth() == 0 || !(name.starts_with('.') || content.is_ignored(name))
    });

    for entry in walk {
        match entry {
            Ok(e) if e.file_type().is_file() && content.is_post(e.path()) => {
                posts.files.push(e.into_path());
            }
            Ok(_) => {}
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                posts.unreadable.push(RewriteError::Read(path, err.into()));
            }
        }
    }

    posts.files.sort();
    Ok(posts)
}

// ============================================================================
// Rewriting
// ============================================================================

/// Rewrite one post in place, returning the number of references converted.
///
/// The file is only written when something changed and `dry_run` is off.
pub fn rewrite_file(
    path: &Path,
    rewriter: &Rewriter,
    direction: Direction,
    dry_run: bool,
) -> Result<usize, RewriteError> {
    let text = fs::read_to_string(path).map_err(|err| RewriteError::Read(path.to_owned(), err))?;
    let out = rewriter.rewrite(&text, direction);

    if out.is_changed() && !dry_run {
        fs::write(path, out.text.as_bytes())
            .map_err(|err| RewriteError::Write(path.to_owned(), err))?;
    }
    Ok(out.count)
}

/// Outcome of a batch run.
#[derive(Debug)]
pub struct Summary {
    pub direction: Direction,
    pub dry_run: bool,
    /// Content root, used to shorten paths in the report
    pub root: PathBuf,
    /// Number of posts scanned, including the ones the walk could not reach
    pub scanned: usize,
    /// Posts with at least one rewritten reference, in path order
    pub changed: Vec<(PathBuf, usize)>,
    pub failed: Vec<RewriteError>,
}

impl Summary {
    /// Total number of references rewritten
    pub fn rewritten(&self) -> usize {
        self.changed.iter().map(|(_, n)| n).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Print one line per changed or failed post, then the totals.
    pub fn report(&self) {
        let module = self.direction.name();
        for (path, count) in &self.changed {
            log!(module; "{} ({} {})", relative(&self.root, path), count, plural(*count, "reference"));
        }
        for err in &self.failed {
            log!("error"; "{}", ErrorChain(err));
        }

        let verb = if self.dry_run { "would rewrite" } else { "rewrote" };
        log!(
            module;
            "{} {} {} to {} form in {} of {} {}",
            verb,
            self.rewritten(),
            plural(self.rewritten(), "reference"),
            self.direction.target(),
            self.changed.len(),
            self.scanned,
            plural(self.scanned, "file"),
        );
        if !self.failed.is_empty() {
            log!("error"; "{} {} failed", self.failed.len(), plural(self.failed.len(), "file"));
        }
    }
}

/// Rewrite every post below the content root.
pub fn rewrite_dir(config: &SiteConfig, direction: Direction, dry_run: bool) -> Result<Summary> {
    let rewriter = Rewriter::new(&config.rewrite).context("Failed to compile reference patterns")?;
    let root = config.content_dir();
    let posts = collect_posts(root, &config.content)?;

    let results: Vec<_> = posts
        .files
        .par_iter()
        .map(|path| (path, rewrite_file(path, &rewriter, direction, dry_run)))
        .collect();

    let mut summary = Summary {
        direction,
        dry_run,
        root: root.to_owned(),
        scanned: posts.total(),
        changed: Vec::new(),
        failed: posts.unreadable,
    };
    for (path, result) in results {
        match result {
            Ok(0) => {}
            Ok(count) => summary.changed.push((path.clone(), count)),
            Err(err) => summary.failed.push(err),
        }
    }

    Ok(summary)
}

/// Entry point of the `publish` and `author` commands.
pub fn rewrite_site(config: &SiteConfig, direction: Direction, dry_run: bool) -> Result<()> {
    log!(direction.name(); "scanning {}", config.content_dir().display());
    let summary = rewrite_dir(config, direction, dry_run)?;
    summary.report();

    if !summary.is_success() {
        bail!("{} of {} files could not be processed", summary.failed.len(), summary.scanned);
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Display a borrowed error followed by its source chain.
#[derive(Debug)]
pub(crate) struct ErrorChain<'a>(pub &'a RewriteError);

impl std::fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = std::error::Error::source(self.0);
        while let Some(err) = source {
            write!(f, ": {err}")?;
            source = std::error::Error::source(err);
        }
        Ok(())
    }
}

/// Path relative to `root` for display, falling back to the full path.
pub(crate) fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

pub(crate) fn plural(n: usize, word: &str) -> String {
    if n == 1 { word.to_owned() } else { format!("{word}s") }
}
