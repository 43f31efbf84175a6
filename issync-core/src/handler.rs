//! # Event Handler
//!
//! Handler-style entry point: an event naming a repository and a destination
//! table goes in, a confirmation message comes out. The CLI and any trigger
//! mechanism both dispatch through here.

use std::sync::LazyLock;

use issync_gh::GitHubClient;
use issync_synapse::{SynapseClient, TableStore};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::ExporterConfig;
use crate::error::ExportError;
use crate::exporter::{ExportOptions, IssueExporter};

static REPO_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("Failed to compile repository regex"));

/// Export request: which repository to read and which table to replace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEvent {
  /// Repository in `owner/name` form
  pub repo: String,
  /// Synapse table id, e.g. `syn123`
  pub table_id: String,
}

impl ExportEvent {
  pub fn new(repo: impl Into<String>, table_id: impl Into<String>) -> Self {
    Self {
      repo: repo.into(),
      table_id: table_id.into(),
    }
  }

  /// Reject events that cannot name a repository or table.
  pub fn validate(&self) -> Result<(), ExportError> {
    if !REPO_REGEX.is_match(&self.repo) {
      return Err(ExportError::Configuration(format!(
        "repository must be in 'owner/name' form, got '{}'",
        self.repo
      )));
    }
    if self.table_id.trim().is_empty() {
      return Err(ExportError::Configuration("table id must not be empty".to_string()));
    }
    Ok(())
  }
}

/// Confirmation payload returned by the handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResponse {
  pub message: String,
}

impl HandlerResponse {
  pub fn stored(table_id: &str) -> Self {
    Self {
      message: format!("Stored issues to table {table_id}"),
    }
  }
}

/// Export the issues of `event.repo` into `event.table_id` using the GitHub
/// and Synapse services named in `config`.
pub async fn issues_to_table_handler(
  event: &ExportEvent,
  config: &ExporterConfig,
) -> Result<HandlerResponse, ExportError> {
  let github = GitHubClient::with_base_url(&config.github_api_url, config.github_auth.clone());
  let mut store = SynapseClient::new(&config.synapse_base_url, config.synapse_auth.clone());

  run_export(event, config, &github, &mut store).await
}

/// Same as [`issues_to_table_handler`] with caller-provided clients.
#[instrument(skip(config, github, store), fields(repo = %event.repo, table_id = %event.table_id))]
pub async fn run_export<S: TableStore>(
  event: &ExportEvent,
  config: &ExporterConfig,
  github: &GitHubClient,
  store: &mut S,
) -> Result<HandlerResponse, ExportError> {
  event.validate()?;

  let summary = IssueExporter::new(github, store, ExportOptions::from(config))
    .run(&event.repo, &event.table_id)
    .await?;
  info!(
    "Exported {} issues over {} pages, replacing {} rows",
    summary.rows, summary.pages, summary.deleted
  );

  Ok(HandlerResponse::stored(&summary.table_id))
}
