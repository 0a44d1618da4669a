//! Binary crate for the `aqmon` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Talking to a running server (`watch`, `export`)
//! - Human-friendly output formatting

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod cli;
mod client;
mod export;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), verbose))
        .with_target(false)
        .init();
}

/// `RUST_LOG` when set, `info` otherwise; `-v` adds a global `debug` directive.
fn env_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    let filter = rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    if verbose { filter.add_directive(Level::DEBUG.into()) } else { filter }
}
