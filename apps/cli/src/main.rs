//! Pressroom CLI — document to publishable article conversion.
//!
//! Converts DOCX, markdown, and HTML documents into publishable HTML
//! articles with placed figures, navigation metadata, and read time.

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
