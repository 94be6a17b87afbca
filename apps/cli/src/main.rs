//! startupintel CLI — discover and rank startups with authentic ML work.
//!
//! Collects companies from configured sources, scores how real their AI/ML
//! claims are, and ranks them against a target profile.

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
