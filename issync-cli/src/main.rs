//! # issync CLI Entry Point
//!
//! The main entry point for the issync command-line tool, which exports a
//! GitHub repository's open issues into a Synapse table.

use anyhow::Result;
use clap::Parser;
use issync_cli::cli::{self, handle_cli};
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
  let cmd = cli::Cli::parse();

  // Set up tracing based on verbosity level
  let level = match cmd.verbose {
    0 => tracing::Level::INFO,  // Default: progress and confirmation
    1 => tracing::Level::DEBUG, // -v: request and paging detail
    _ => tracing::Level::TRACE, // -vv or more: everything
  };

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(EnvFilter::from_default_env().add_directive(level.into()))
    .init();

  debug!("Tracing initialized with level: {}", level);

  handle_cli(cmd)
}
