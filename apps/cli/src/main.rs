//! Serialbind CLI — bind web-serial chapters into an EPUB.
//!
//! Reads a book manifest (chapter URLs + metadata), downloads and
//! normalizes each chapter, and writes a single `.epub` file.

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
