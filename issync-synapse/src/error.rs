use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by Synapse table operations
#[derive(Debug, Error)]
pub enum TableError {
  /// Synapse answered with a non-success status.
  #[error("Synapse returned HTTP {status}: {reason}")]
  Http { status: u16, reason: String },

  #[error("Request to Synapse failed")]
  Request(#[from] reqwest::Error),

  /// A table call was made before [`crate::SynapseClient::login`].
  #[error("Not logged in to Synapse")]
  NotLoggedIn,

  /// The API key could not be used as a signing key.
  #[error("Invalid Synapse API key: {0}")]
  InvalidApiKey(String),

  #[error("Invalid Synapse URL '{url}'")]
  InvalidUrl {
    url: String,
    #[source]
    source: url::ParseError,
  },

  /// An asynchronous job reported failure.
  #[error("Synapse job failed: {message}")]
  JobFailed { message: String },

  /// An asynchronous job was still running when the wait ran out.
  #[error("Synapse job {token} did not finish within {waited_secs}s")]
  JobTimeout { token: String, waited_secs: u64 },

  /// The multipart file upload did not produce a file handle.
  #[error("File upload failed: {0}")]
  Upload(String),

  #[error("Failed to read staged table {}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl TableError {
  /// True when Synapse rejected the call with a 4xx status.
  pub fn is_client_error(&self) -> bool {
    matches!(self, Self::Http { status, .. } if (400..500).contains(status))
  }
}
