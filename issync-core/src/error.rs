//! Error taxonomy for an export run.

use issync_gh::GitHubError;
use issync_synapse::TableError;
use thiserror::Error;

/// Errors that abort an export run
#[derive(Debug, Error)]
pub enum ExportError {
  /// Missing or invalid configuration, raised before any network call.
  #[error("Configuration error: {0}")]
  Configuration(String),

  /// GitHub answered an issues request with a status other than 200.
  #[error("GitHub API returned HTTP {status} for {url}")]
  Http { status: u16, url: String },

  /// Any other failure while fetching issues.
  #[error("Failed to fetch issues from GitHub")]
  Fetch(#[source] GitHubError),

  /// The issue list kept linking to further pages past the cap.
  #[error("Stopped after {limit} pages: the issue list kept reporting a next page")]
  PageLimitExceeded { limit: usize },

  /// A Synapse call failed.
  #[error("Synapse table operation failed")]
  Store(#[from] TableError),

  /// Writing the staged CSV failed.
  #[error("Failed to stage exported rows")]
  Staging(#[from] csv::Error),
}

impl ExportError {
  pub(crate) fn missing_env(name: &str) -> Self {
    Self::Configuration(format!("missing required environment variable '{name}'"))
  }

  /// HTTP status behind the error, if a remote service answered.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Http { status, .. } => Some(*status),
      Self::Fetch(error) => error.status(),
      Self::Store(TableError::Http { status, .. }) => Some(*status),
      _ => None,
    }
  }
}

impl From<GitHubError> for ExportError {
  fn from(error: GitHubError) -> Self {
    match error {
      GitHubError::Status { status, url } => Self::Http { status, url },
      other => Self::Fetch(other),
    }
  }
}
