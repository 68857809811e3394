//! Terminal output.
//!
//! Every line reads `[module] message`. The modules relink logs under are the
//! command names (`publish`, `author`, `check`) and the severities `warn` and
//! `error`. Severities go to stderr so that a pre-commit hook can keep the
//! report and the diagnostics apart; everything else goes to stdout.
//!
//! ```ignore
//! log!("publish"; "{} ({} references)", path, count);
//! log!("error"; "{}", ErrorChain(err));
//! ```
//!
//! On a terminal, lines wider than the window are shortened in the middle,
//! so both the directory and the file name of a post stay visible. Piped
//! output is never shortened.

use colored::{ColoredString, Colorize};
use crossterm::terminal::size;
use std::{
    borrow::Cow,
    io::{IsTerminal, Write, stderr, stdout},
    sync::OnceLock,
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<usize> = OnceLock::new();

const FALLBACK_WIDTH: usize = 120;
const ELLIPSIS: char = '…';

/// Columns taken by `[module] `.
#[inline]
fn prefix_width(module: &str) -> usize {
    module.chars().count() + 3
}

fn terminal_width() -> usize {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w as usize).unwrap_or(FALLBACK_WIDTH))
}

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::utils::log::log($module, &format!($($arg)*))
    }};
}

// ============================================================================
// Channels
// ============================================================================

/// What a line is about, derived from its module name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    /// `publish` / `author` progress and totals
    Rewrite,
    Check,
    Warn,
    Error,
    Other,
}

impl Channel {
    fn of(module: &str) -> Self {
        match module.to_ascii_lowercase().as_str() {
            "publish" | "author" => Self::Rewrite,
            "check" => Self::Check,
            "warn" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Other,
        }
    }

    const fn is_diagnostic(self) -> bool {
        matches!(self, Self::Warn | Self::Error)
    }

    fn paint(self, module: &str) -> ColoredString {
        let prefix = format!("[{module}]");
        match self {
            Self::Rewrite => prefix.bright_blue(),
            Self::Check => prefix.bright_green(),
            Self::Warn => prefix.yellow(),
            Self::Error => prefix.bright_red(),
            Self::Other => prefix.bright_yellow(),
        }
        .bold()
    }
}

// ============================================================================
// Output
// ============================================================================

/// Print one line under `module`.
pub fn log(module: &str, message: &str) {
    let channel = Channel::of(module);
    let prefix = channel.paint(module);
    let width = prefix_width(module);

    if channel.is_diagnostic() {
        emit(stderr().lock(), &prefix, width, message);
    } else {
        emit(stdout().lock(), &prefix, width, message);
    }
}

fn emit(mut out: impl Write + IsTerminal, prefix: &ColoredString, prefix_width: usize, message: &str) {
    let message = if out.is_terminal() {
        shorten(message, terminal_width().saturating_sub(prefix_width))
    } else {
        Cow::Borrowed(message)
    };
    writeln!(out, "{prefix} {message}").ok();
    out.flush().ok();
}

/// Fit `s` into `max` columns, one per char, by eliding its middle.
fn shorten(s: &str, max: usize) -> Cow<'_, str> {
    let len = s.chars().count();
    if len <= max {
        return Cow::Borrowed(s);
    }
    if max == 0 {
        return Cow::Borrowed("");
    }

    let tail = (max - 1) / 2;
    let head = max - 1 - tail;
    let mut out: String = s.chars().take(head).collect();
    out.push(ELLIPSIS);
    out.extend(s.chars().skip(len - tail));
    Cow::Owned(out)
}
