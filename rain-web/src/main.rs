//! Binary crate for the `rain-web` server.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Loading configuration and initializing logging
//! - Serving the page and one-shot terminal checks

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
