//! relink - rewrite blog image references between authoring and publishing form.

mod batch;
mod check;
mod cli;
mod config;
mod rewrite;
mod utils;

use anyhow::Result;
use batch::rewrite_site;
use check::check_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use rewrite::Direction;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Publish { args } => rewrite_site(&config, Direction::ToPublishing, args.dry_run),
        Commands::Author { args } => rewrite_site(&config, Direction::ToAuthoring, args.dry_run),
        Commands::Check { strict } => check_site(&config, *strict),
    }
}
