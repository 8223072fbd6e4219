//! Binary crate for the `skydash` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Assembling the key sources the core resolves
//! - Human-friendly output formatting and config.local.js generation

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod genconfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
