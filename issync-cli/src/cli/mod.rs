//! # Command Line Interface
//!
//! Argument parsing and dispatch for the issync tool. An export is described
//! either by a repository and table id on the command line or by a JSON event
//! read from a file or stdin.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{ArgAction, Parser};
use issync_core::{ExportEvent, ExporterConfig, HandlerResponse, issues_to_table_handler};
use tracing::{debug, info};

/// Top-level CLI command for the issync tool
#[derive(Parser, Debug)]
#[command(name = "issync")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(about = "Export a GitHub repository's open issues into a Synapse table")]
#[command(
  long_about = "Fetches every open issue of a GitHub repository and replaces the rows of a\n\
        Synapse table with them, one row per issue.\n\n\
        Credentials are read from the environment: GITHUB_TOKEN (or GITHUB_USER and\n\
        GITHUB_PASSWORD when the token is empty), SYNAPSE_USERNAME and SYNAPSE_API_KEY."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(max_term_width = 120)]
#[command(styles = Styles::styled()
    .header(AnsiColor::BrightGreen.on_default().bold().underline())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::BrightGreen.on_default().bold())
    .placeholder(AnsiColor::BrightWhite.on_default().italic())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::BrightRed.on_default().bold())
)]
pub struct Cli {
  /// Sets the level of verbosity (can be used multiple times)
  #[arg(
    short = 'v',
    long = "verbose",
    action = ArgAction::Count,
    long_help = "Sets the level of verbosity for tracing and logging output.\n\n\
             -v: Show debug level messages\n\
             -vv: Show trace level messages"
  )]
  pub verbose: u8,

  /// Repository to export, in owner/name form
  #[arg(value_name = "OWNER/NAME", required_unless_present = "event", conflicts_with = "event")]
  pub repo: Option<String>,

  /// Synapse table whose rows are replaced
  #[arg(
    long = "table-id",
    alias = "table_id",
    value_name = "SYN_ID",
    required_unless_present = "event",
    conflicts_with = "event"
  )]
  pub table_id: Option<String>,

  /// Read the export event as JSON from a file, or from stdin with '-'
  #[arg(
    long,
    value_name = "FILE",
    long_help = "Read the export event from a JSON file instead of the command line.\n\n\
             The event has the form {\"repo\": \"owner/name\", \"table_id\": \"syn123\"}.\n\
             Use '-' to read it from stdin."
  )]
  pub event: Option<PathBuf>,

  /// Maximum number of issue pages to fetch
  #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
  pub max_pages: Option<u64>,

  /// Directory for the staged CSV file
  #[arg(long, value_name = "DIR")]
  pub staging_dir: Option<PathBuf>,
}

impl Cli {
  /// Build the export event from the arguments or the event file.
  pub fn export_event(&self) -> Result<ExportEvent> {
    if let Some(path) = &self.event {
      return read_event(path);
    }

    match (&self.repo, &self.table_id) {
      (Some(repo), Some(table_id)) => Ok(ExportEvent::new(repo.as_str(), table_id.as_str())),
      _ => anyhow::bail!("Both a repository and --table-id are required"),
    }
  }

  /// Apply command-line overrides on top of the environment configuration.
  pub fn apply_overrides(&self, mut config: ExporterConfig) -> Result<ExporterConfig> {
    if let Some(max_pages) = self.max_pages {
      let max_pages = usize::try_from(max_pages).context("--max-pages is out of range")?;
      config = config.with_max_pages(max_pages)?;
    }
    if let Some(dir) = &self.staging_dir {
      config = config.with_staging_dir(dir);
    }
    Ok(config)
  }
}

fn read_event(path: &Path) -> Result<ExportEvent> {
  let raw = if path == Path::new("-") {
    let mut raw = String::new();
    std::io::stdin()
      .read_to_string(&mut raw)
      .context("Failed to read event from stdin")?;
    raw
  } else {
    fs::read_to_string(path).with_context(|| format!("Failed to read event file {}", path.display()))?
  };

  parse_event(&raw).with_context(|| format!("Invalid export event in {}", path.display()))
}

fn parse_event(raw: &str) -> Result<ExportEvent> {
  let event: ExportEvent = serde_json::from_str(raw)?;
  Ok(event)
}

pub fn handle_cli(cli: Cli) -> Result<()> {
  let event = cli.export_event()?;
  let config = ExporterConfig::from_env().context("Failed to load configuration from the environment")?;
  let config = cli.apply_overrides(config)?;
  debug!("Exporting {} into {}", event.repo, event.table_id);

  let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
  let response = rt
    .block_on(issues_to_table_handler(&event, &config))
    .with_context(|| format!("Failed to export issues of {} to table {}", event.repo, event.table_id))?;

  report(&response)
}

#[allow(clippy::print_stdout)]
fn report(response: &HandlerResponse) -> Result<()> {
  info!("{}", response.message);
  println!("{}", serde_json::to_string(response)?);
  Ok(())
}
