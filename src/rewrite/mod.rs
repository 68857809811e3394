//! Image reference rewriting between authoring and publishing form.
//!
//! # Forms
//!
//! | Form       | Markdown                                         | HTML                                                   |
//! |------------|--------------------------------------------------|--------------------------------------------------------|
//! | Authoring  | `![alt](./assets/foo.png)`                       | `<img src="./assets/foo.png">`                         |
//! | Publishing | `![alt]({{ '/assets/foo.png' \| absolute_url }})` | `<img src="{{ '/assets/foo.png' \| absolute_url }}">`  |
//!
//! Only the URL part of a reference is replaced. Alt text, titles and other
//! `<img>` attributes are passed through byte-for-byte, as is everything
//! outside the [rewritable regions](regions::rewritable_spans).
//!
//! # Example
//!
//! ```ignore
//! let rewriter = Rewriter::new(&config.rewrite)?;
//! let out = rewriter.rewrite(text, Direction::ToPublishing);
//! if out.is_changed() {
//!     fs::write(path, out.text.as_ref())?;
//! }
//! ```

mod error;
mod pattern;
mod regions;

pub use error::RewriteError;

use crate::config::{QuoteStyle, RewriteConfig};
use pattern::{Patterns, is_valid_name};
use regex::Regex;
use std::{borrow::Cow, fmt, ops::Range};

// ============================================================================
// Forms and Directions
// ============================================================================

/// Textual convention of an image reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    /// Local relative path, previewable by the note-taking tool.
    Authoring,
    /// Liquid template resolved by the site generator.
    Publishing,
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Authoring => "authoring",
            Self::Publishing => "publishing",
        })
    }
}

/// Which way a batch run converts references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToPublishing,
    ToAuthoring,
}

impl Direction {
    /// Form matched by this direction
    pub const fn source(self) -> Form {
        match self {
            Self::ToPublishing => Form::Authoring,
            Self::ToAuthoring => Form::Publishing,
        }
    }

    /// Form produced by this direction
    pub const fn target(self) -> Form {
        match self {
            Self::ToPublishing => Form::Publishing,
            Self::ToAuthoring => Form::Authoring,
        }
    }

    /// Short name used as log prefix
    pub const fn name(self) -> &'static str {
        match self {
            Self::ToPublishing => "publish",
            Self::ToAuthoring => "author",
        }
    }
}

// ============================================================================
// Matches
// ============================================================================

/// A recognised image reference inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub form: Form,
    /// Asset file name below the assets directory, e.g. `2024/foo.png`
    pub name: String,
    /// Whole reference, e.g. `![alt](./assets/foo.png)`
    pub span: Range<usize>,
    /// The replaced part, e.g. `./assets/foo.png`
    pub url: Range<usize>,
}

/// Result of rewriting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten<'a> {
    /// New document text, borrowed when nothing changed
    pub text: Cow<'a, str>,
    /// Number of references rewritten
    pub count: usize,
}

impl Rewritten<'_> {
    pub fn is_changed(&self) -> bool {
        self.count > 0
    }
}

// ============================================================================
// Rewriter
// ============================================================================

/// Compiled matcher and renderer for one `[rewrite]` configuration.
///
/// Immutable after construction, so a single instance is shared by all
/// worker threads of a batch run.
#[derive(Debug, Clone)]
pub struct Rewriter {
    patterns: Patterns,
    assets_dir: String,
    filter: String,
    quote: QuoteStyle,
}

impl Rewriter {
    pub fn new(config: &RewriteConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: Patterns::new(config)?,
            assets_dir: config.assets_dir.clone(),
            filter: config.filter.clone(),
            quote: config.quote,
        })
    }

    /// All references of either form in the rewritable regions of `text`,
    /// sorted by position.
    pub fn find(&self, text: &str) -> Vec<ImageRef> {
        let mut refs = Vec::new();
        for region in regions::rewritable_spans(text) {
            let base = region.start;
            let prose = &text[region];
            let p = &self.patterns;
            collect(&p.markdown_authoring, Form::Authoring, prose, base, &mut refs);
            collect(&p.markdown_publishing, Form::Publishing, prose, base, &mut refs);
            collect(&p.html_authoring, Form::Authoring, prose, base, &mut refs);
            collect(&p.html_publishing, Form::Publishing, prose, base, &mut refs);
        }

        refs.sort_by_key(|r| (r.span.start, r.span.end));
        // A Markdown alt text may embed an <img> tag; the outer match wins
        let mut last_end = 0;
        refs.retain(|r| {
            let keep = r.span.start >= last_end;
            if keep {
                last_end = r.span.end;
            }
            keep
        });
        refs
    }

    /// Convert every reference in the source form of `direction`.
    ///
    /// References already in the target form do not match and are left
    /// alone, so applying the same direction twice is a no-op.
    pub fn rewrite<'a>(&self, text: &'a str, direction: Direction) -> Rewritten<'a> {
        let refs: Vec<_> = self
            .find(text)
            .into_iter()
            .filter(|r| r.form == direction.source())
            .collect();

        if refs.is_empty() {
            return Rewritten {
                text: Cow::Borrowed(text),
                count: 0,
            };
        }

        let mut out = String::with_capacity(text.len() + refs.len() * 32);
        let mut cursor = 0;
        for r in &refs {
            out.push_str(&text[cursor..r.url.start]);
            out.push_str(&self.render(direction.target(), &r.name));
            cursor = r.url.end;
        }
        out.push_str(&text[cursor..]);

        Rewritten {
            text: Cow::Owned(out),
            count: refs.len(),
        }
    }

    /// URL text for an asset name in the given form.
    pub fn render(&self, form: Form, name: &str) -> String {
        let assets = &self.assets_dir;
        match form {
            Form::Authoring => format!("./{assets}/{name}"),
            Form::Publishing => {
                let q = self.quote.as_char();
                format!("{{{{ {q}/{assets}/{name}{q} | {} }}}}", self.filter)
            }
        }
    }
}

/// Push the valid matches of `re` in `prose` (offset by `base`) to `refs`.
fn collect(re: &Regex, form: Form, prose: &str, base: usize, refs: &mut Vec<ImageRef>) {
    for caps in re.captures_iter(prose) {
        let (Some(whole), Some(url), Some(name)) = (caps.get(0), caps.name("url"), caps.name("name"))
        else {
            continue;
        };

        let same = |a: &str, b: &str| match (caps.name(a), caps.name(b)) {
            (Some(a), Some(b)) => a.as_str() == b.as_str(),
            (None, None) => true,
            _ => false,
        };
        if !same("lq1", "lq2") || !same("hq1", "hq2") || !is_valid_name(name.as_str()) {
            continue;
        }

        refs.push(ImageRef {
            form,
            name: name.as_str().to_owned(),
            span: base + whole.start()..base + whole.end(),
            url: base + url.start()..base + url.end(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> Rewriter {
        Rewriter::new(&RewriteConfig::default()).unwrap()
    }

    fn publish(text: &str) -> String {
        rewriter().rewrite(text, Direction::ToPublishing).text.into_owned()
    }

    fn author(text: &str) -> String {
        rewriter().rewrite(text, Direction::ToAuthoring).text.into_owned()
    }

    // ------------------------------------------------------------------------
    // Scenarios
    // ------------------------------------------------------------------------

    #[test]
    fn test_diagram_scenario() {
        let original = "![diagram](./assets/foo.png)";
        let published = publish(original);
        assert_eq!(published, "![diagram]({{ '/assets/foo.png' | absolute_url }})");
        assert_eq!(author(&published), original);
    }

    #[test]
    fn test_title_and_html_attributes_preserved() {
        let original = concat!(
            "Intro.\n\n",
            "![a](./assets/a.png \"Figure 1\")\n",
            "<img class=\"wide\" src=\"./assets/b.jpg\" width=\"300\">\n",
        );
        let published = publish(original);
        assert_eq!(
            published,
            concat!(
                "Intro.\n\n",
                "![a]({{ '/assets/a.png' | absolute_url }} \"Figure 1\")\n",
                "<img class=\"wide\" src=\"{{ '/assets/b.jpg' | absolute_url }}\" width=\"300\">\n",
            )
        );
        assert_eq!(author(&published), original);
    }

    #[test]
    fn test_round_trip_full_post() {
        let original = concat!(
            "---\n",
            "title: Notes on caching\n",
            "tags: [rust, cache]\n",
            "cover: ./assets/cover.png\n",
            "---\n",
            "\n",
            "![cover](./assets/cover.png)\n",
            "\n",
            "The files live in `./assets/` next to the post, e.g. assets/foo.png.\n",
            "\n",
            "```markdown\n",
            "![example](./assets/example.png)\n",
            "```\n",
            "\n",
            "![two](./assets/2024/two.webp) and ![three](./assets/three.gif)\r\n",
        );

        let published = publish(original);
        assert!(published.contains("cover: ./assets/cover.png\n"));
        assert!(published.contains("![example](./assets/example.png)"));
        assert!(published.contains("![two]({{ '/assets/2024/two.webp' | absolute_url }})"));
        assert_eq!(rewriter().find(&published).len(), 3);

        assert_eq!(author(&published), original);
    }

    // ------------------------------------------------------------------------
    // Idempotence and precision
    // ------------------------------------------------------------------------

    #[test]
    fn test_publish_is_idempotent() {
        let once = publish("![x](./assets/x.png)\n<img src='./assets/y.png'>");
        let twice = rewriter().rewrite(&once, Direction::ToPublishing);
        assert_eq!(twice.count, 0);
        assert!(matches!(twice.text, Cow::Borrowed(_)));
        assert_eq!(twice.text, once);
    }

    #[test]
    fn test_author_is_idempotent() {
        let text = "![x](./assets/x.png)";
        let out = rewriter().rewrite(text, Direction::ToAuthoring);
        assert!(!out.is_changed());
        assert_eq!(out.text, text);
    }

    #[test]
    fn test_prose_left_untouched() {
        let text = concat!(
            "Images go in ./assets/ or assets/foo.png.\n",
            "[not an image](./assets/foo.png)\n",
            "![relative](assets/foo.png)\n",
            "![escape](./assets/../secret.png)\n",
            "![spaced](./assets/my file.png)\n",
            "![other]({{ '/assets/foo.png' | relative_url }})\n",
            "![mixed quotes]({{ '/assets/foo.png\" | absolute_url }})\n",
        );
        assert_eq!(publish(text), text);
        assert_eq!(author(text), text);
    }

    #[test]
    fn test_indented_code_block_untouched() {
        let text = "Example:\n\n    ![x](./assets/x.png)\n\nend\n";
        let out = rewriter().rewrite(text, Direction::ToPublishing);
        assert_eq!(out.count, 0);
        assert_eq!(out.text, text);
    }

    #[test]
    fn test_fence_inside_html_comment_is_ignored() {
        let text = "<!--\n```\n-->\n![x](./assets/x.png)\n";
        let out = rewriter().rewrite(text, Direction::ToPublishing);
        assert_eq!(out.count, 1);
        assert_eq!(out.text, "<!--\n```\n-->\n![x]({{ '/assets/x.png' | absolute_url }})\n");
    }

    #[test]
    fn test_front_matter_after_bom_untouched() {
        let text = "\u{feff}---\ntitle: \"![x](./assets/x.png)\"\n---\nbody\n";
        let out = rewriter().rewrite(text, Direction::ToPublishing);
        assert_eq!(out.count, 0);
        assert_eq!(out.text, text);
    }

    #[test]
    fn test_author_normalises_publishing_spacing() {
        let text = r#"![x]({{"/assets/x.png"|absolute_url}})"#;
        assert_eq!(author(text), "![x](./assets/x.png)");
    }

    #[test]
    fn test_img_inside_alt_counts_once() {
        let text = r#"![<img src="./assets/a.png">](./assets/b.png)"#;
        let refs = rewriter().find(text);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "b.png");
    }

    #[test]
    fn test_find_reports_both_forms_in_order() {
        let text = "![a]({{ '/assets/a.png' | absolute_url }}) ![b](./assets/b.png)";
        let refs = rewriter().find(text);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].form, Form::Publishing);
        assert_eq!(refs[0].name, "a.png");
        assert_eq!(refs[1].form, Form::Authoring);
        assert_eq!(&text[refs[1].url.clone()], "./assets/b.png");
        assert_eq!(&text[refs[1].span.clone()], "![b](./assets/b.png)");
    }

    #[test]
    fn test_non_ascii_names_and_alt() {
        let original = "![图表](./assets/图表-1.png)";
        let published = publish(original);
        assert_eq!(published, "![图表]({{ '/assets/图表-1.png' | absolute_url }})");
        assert_eq!(author(&published), original);
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    #[test]
    fn test_custom_config_render() {
        let rewriter = Rewriter::new(&RewriteConfig {
            assets_dir: "images".into(),
            filter: "relative_url".into(),
            quote: QuoteStyle::Double,
        })
        .unwrap();

        let out = rewriter.rewrite("![x](./images/x.png) ![y](./assets/y.png)", Direction::ToPublishing);
        assert_eq!(out.count, 1);
        assert_eq!(
            out.text,
            r#"![x]({{ "/images/x.png" | relative_url }}) ![y](./assets/y.png)"#
        );
    }

    #[test]
    fn test_direction_forms() {
        assert_eq!(Direction::ToPublishing.source(), Form::Authoring);
        assert_eq!(Direction::ToPublishing.target(), Form::Publishing);
        assert_eq!(Direction::ToAuthoring.source(), Form::Publishing);
        assert_eq!(Direction::ToAuthoring.name(), "author");
        assert_eq!(Form::Publishing.to_string(), "publishing");
    }
}
