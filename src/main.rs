// src/main.rs

//! codepad
//!
//! Entry point for the codepad CLI.
//!
//! Responsibilities of this file:
//! - Install logging (stderr, `RUST_LOG`, default `warn`)
//! - Parse CLI arguments
//! - Hand off execution to the runner

use anyhow::Result;
use clap::Parser;
use codepad::{cli, runner};
use tracing_subscriber::EnvFilter;

/// Program entry point.
///
/// The workbench is single-threaded, so a current-thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    runner::run(cli).await
}
