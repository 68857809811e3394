//! Rewritable regions of a Markdown document.
//!
//! Image references are only recognised in prose. The document is parsed
//! with pulldown-cmark and the source ranges of these events are protected:
//!
//! | Region            | Event                                            |
//! |-------------------|--------------------------------------------------|
//! | Front matter      | `Tag::MetadataBlock` (`---` YAML or `+++` TOML)  |
//! | Code block        | `Tag::CodeBlock`, fenced or indented             |
//! | Inline code span  | `Event::Code`                                    |
//! | HTML comment      | `Tag::HtmlBlock` / `Event::InlineHtml` starting with `<!--` |
//!
//! A leading byte order mark is skipped before parsing, so front matter
//! after a BOM is still front matter.

use pulldown_cmark::{Event, Options, Parser, Tag};
use std::ops::Range;

const BOM: &str = "\u{feff}";

fn options() -> Options {
    Options::ENABLE_YAML_STYLE_METADATA_BLOCKS | Options::ENABLE_PLUSES_DELIMITED_METADATA_BLOCKS
}

#[inline]
fn is_comment(source: &str) -> bool {
    source.trim_start().starts_with("<!--")
}

/// Byte ranges of `text` that must never be rewritten, sorted by start.
///
/// Ranges may nest or overlap (e.g. code inside a commented block).
fn protected_spans(text: &str) -> Vec<Range<usize>> {
    let base = if text.starts_with(BOM) { BOM.len() } else { 0 };
    let body = &text[base..];

    let mut spans: Vec<_> = Parser::new_ext(body, options())
        .into_offset_iter()
        .filter_map(|(event, range)| {
            let protected = match event {
                Event::Start(Tag::CodeBlock(_) | Tag::MetadataBlock(_)) | Event::Code(_) => true,
                Event::Start(Tag::HtmlBlock) | Event::InlineHtml(_) => {
                    is_comment(&body[range.clone()])
                }
                _ => false,
            };
            protected.then(|| base + range.start..base + range.end)
        })
        .collect();

    spans.sort_by_key(|r| r.start);
    spans
}

/// Byte ranges of `text` in which image references may be rewritten.
///
/// Ranges are sorted, non-empty and non-overlapping.
pub fn rewritable_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    for protected in protected_spans(text) {
        if protected.start > cursor {
            spans.push(cursor..protected.start);
        }
        cursor = cursor.max(protected.end);
    }
    if cursor < text.len() {
        spans.push(cursor..text.len());
    }
    spans
}
