//! Binary crate for the `rainbot` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Wiring the conversation processor and relaying turns from the terminal

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Replies go to stdout, diagnostics to stderr.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
