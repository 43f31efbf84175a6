//! Errors produced by the GitHub client.

use thiserror::Error;

/// Failure modes of a GitHub API call
#[derive(Debug, Error)]
pub enum GitHubError {
  /// The API answered with anything other than `200 OK`.
  #[error("GitHub API returned HTTP {status} for {url}")]
  Status { status: u16, url: String },

  /// The request never produced a response.
  #[error("GET {url} failed")]
  Request {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  /// The response body was not the expected issue array.
  #[error("Failed to parse GitHub issues response from {url}")]
  Parse {
    url: String,
    #[source]
    source: serde_json::Error,
  },

  /// A continuation link points away from the configured API host.
  #[error("Refusing to follow '{url}': it is not served by {base_url}")]
  UntrustedLink { url: String, base_url: String },

  /// A request or continuation URL could not be parsed.
  #[error("Invalid GitHub URL '{url}'")]
  InvalidUrl {
    url: String,
    #[source]
    source: url::ParseError,
  },
}

impl GitHubError {
  /// HTTP status carried by the error, if the API responded at all.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Status { status, .. } => Some(*status),
      Self::Request { source, .. } => source.status().map(|s| s.as_u16()),
      Self::Parse { .. } | Self::UntrustedLink { .. } | Self::InvalidUrl { .. } => None,
    }
  }
}
