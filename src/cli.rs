//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rewrite blog image references between authoring and publishing form
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Content directory path (relative to project root)
    #[arg(short, long, global = true)]
    pub content: Option<PathBuf>,

    /// Config file name (default: relink.toml)
    #[arg(short = 'C', long, global = true, default_value = "relink.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared arguments for the two rewrite commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RewriteArgs {
    /// Report what would change without writing any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Convert local asset paths to templated site URLs before committing
    Publish {
        #[command(flatten)]
        args: RewriteArgs,
    },

    /// Convert templated site URLs back to local asset paths for previewing
    Author {
        #[command(flatten)]
        args: RewriteArgs,
    },

    /// Verify that all posts use a single reference form
    Check {
        /// Treat references to missing asset files as errors
        #[arg(long)]
        strict: bool,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_publish(&self) -> bool {
        matches!(self.command, Commands::Publish { .. })
    }
    pub const fn is_author(&self) -> bool {
        matches!(self.command, Commands::Author { .. })
    }
    pub const fn is_check(&self) -> bool {
        matches!(self.command, Commands::Check { .. })
    }
}
