//! Consistency check across all posts.
//!
//! A commit should never mix reference forms: everything pushed to the site
//! generator is in publishing form, everything kept for local previewing is
//! in authoring form. `check` reports which form each post uses, flags the
//! tree as mixed when both appear, and lists references to assets that do
//! not exist on disk.
//!
//! Asset names are resolved against `<project root>/<assets_dir>`
//! ([`SiteConfig::assets_dir`]), not against the directory of the post.
//! Both forms name the same site-wide directory, so a post in
//! `_posts/2024/` referencing `./assets/a.png` is satisfied by
//! `<root>/assets/a.png`.
//!
//! Suitable as a pre-commit hook: it never writes.

use crate::{
    batch::{ErrorChain, collect_posts, plural, relative},
    config::SiteConfig,
    log,
    rewrite::{Form, RewriteError, Rewriter},
};
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Reference usage of a single post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostUsage {
    pub path: PathBuf,
    pub authoring: usize,
    pub publishing: usize,
    /// Asset names referenced but absent from the assets directory
    pub missing: Vec<String>,
}

impl PostUsage {
    /// Form used by this post, `None` if it has no references or mixes both.
    pub fn form(&self) -> Option<Form> {
        match (self.authoring, self.publishing) {
            (0, 0) => None,
            (_, 0) => Some(Form::Authoring),
            (0, _) => Some(Form::Publishing),
            _ => None,
        }
    }

    pub fn is_mixed(&self) -> bool {
        self.authoring > 0 && self.publishing > 0
    }
}

/// Tree-wide verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No image references at all
    Empty,
    Consistent(Form),
    Mixed,
}

/// Outcome of a check run.
#[derive(Debug)]
pub struct Report {
    pub root: PathBuf,
    /// Posts with at least one reference, in path order
    pub posts: Vec<PostUsage>,
    pub scanned: usize,
    pub failed: Vec<RewriteError>,
}

impl Report {
    pub fn verdict(&self) -> Verdict {
        let authoring = self.posts.iter().any(|p| p.authoring > 0);
        let publishing = self.posts.iter().any(|p| p.publishing > 0);
        match (authoring, publishing) {
            (false, false) => Verdict::Empty,
            (true, false) => Verdict::Consistent(Form::Authoring),
            (false, true) => Verdict::Consistent(Form::Publishing),
            (true, true) => Verdict::Mixed,
        }
    }

    /// Number of references to missing assets
    pub fn missing(&self) -> usize {
        self.posts.iter().map(|p| p.missing.len()).sum()
    }

    /// Whether the check passes. Missing assets only fail in strict mode.
    pub fn is_success(&self, strict: bool) -> bool {
        self.failed.is_empty()
            && self.verdict() != Verdict::Mixed
            && !(strict && self.missing() > 0)
    }

    pub fn report(&self) {
        let verdict = self.verdict();

        for post in &self.posts {
            let path = relative(&self.root, &post.path);
            if post.is_mixed() {
                log!(
                    "error";
                    "{path} mixes {} authoring and {} publishing {}",
                    post.authoring,
                    post.publishing,
                    plural(post.authoring + post.publishing, "reference")
                );
            } else if verdict == Verdict::Mixed
                && let Some(form) = post.form()
            {
                log!("check"; "{path} is in {form} form");
            }
            for name in &post.missing {
                log!("warn"; "{path}: missing asset `{name}`");
            }
        }
        for err in &self.failed {
            log!("error"; "{}", ErrorChain(err));
        }

        match verdict {
            Verdict::Empty => log!("check"; "no image references in {} {}", self.scanned, plural(self.scanned, "file")),
            Verdict::Consistent(form) => log!(
                "check";
                "all {} {} in {form} form",
                self.posts.len(),
                plural(self.posts.len(), "post")
            ),
            Verdict::Mixed => log!("error"; "posts mix authoring and publishing form"),
        }
    }
}

/// Classify the references of one post.
fn inspect(path: &Path, rewriter: &Rewriter, assets: &Path) -> Result<PostUsage, RewriteError> {
    let text = fs::read_to_string(path).map_err(|err| RewriteError::Read(path.to_owned(), err))?;

    let mut usage = PostUsage {
        path: path.to_owned(),
        authoring: 0,
        publishing: 0,
        missing: Vec::new(),
    };
    for r in rewriter.find(&text) {
        match r.form {
            Form::Authoring => usage.authoring += 1,
            Form::Publishing => usage.publishing += 1,
        }
        if !assets.join(&r.name).is_file() && !usage.missing.contains(&r.name) {
            usage.missing.push(r.name);
        }
    }
    Ok(usage)
}

/// Inspect every post below the content root without modifying anything.
pub fn check_dir(config: &SiteConfig) -> Result<Report> {
    let rewriter = Rewriter::new(&config.rewrite).context("Failed to compile reference patterns")?;
    let root = config.content_dir();
    let assets = config.assets_dir();
    let posts = collect_posts(root, &config.content)?;

    let results: Vec<_> = posts
        .files
        .par_iter()
        .map(|path| inspect(path, &rewriter, &assets))
        .collect();

    let mut report = Report {
        root: root.to_owned(),
        posts: Vec::new(),
        scanned: posts.total(),
        failed: posts.unreadable,
    };
    for result in results {
        match result {
            Ok(usage) if usage.authoring + usage.publishing == 0 => {}
            Ok(usage) => report.posts.push(usage),
            Err(err) => report.failed.push(err),
        }
    }
    Ok(report)
}

/// Entry point of the `check` command.
pub fn check_site(config: &SiteConfig, strict: bool) -> Result<()> {
    let report = check_dir(config)?;
    report.report();

    if !report.is_success(strict) {
        match report.verdict() {
            Verdict::Mixed => bail!("reference forms are mixed; run `publish` or `author` first"),
            _ if !report.failed.is_empty() => {
                bail!("{} of {} files could not be read", report.failed.len(), report.scanned)
            }
            _ => bail!("{} missing asset {}", report.missing(), plural(report.missing(), "reference")),
        }
    }
    Ok(())
}
