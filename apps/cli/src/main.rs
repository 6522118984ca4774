//! docimport CLI: curate a documentation sitemap and bulk-import it into a
//! knowledge-base notebook.
//!
//! Exit codes: 0 clean, 2 completed with per-URL failures, 1 run failure.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
