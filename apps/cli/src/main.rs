//! reeltab CLI: one-shot movie-listing scraper.
//!
//! Scrapes a static listing page into an index-aligned dataset and renders
//! a descriptive box-plot artifact.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
