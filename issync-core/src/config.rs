//! # Exporter Configuration
//!
//! Credentials and service locations for a run, loaded once at startup from
//! the process environment and passed explicitly to everything that needs
//! them.

use std::path::PathBuf;

use issync_gh::GitHubAuth;
use issync_gh::consts::API_BASE_URL;
use issync_synapse::SynapseAuth;
use issync_synapse::consts::DEFAULT_BASE_URL;
use tracing::debug;

use crate::consts::{
  DEFAULT_MAX_PAGES, ENV_GITHUB_API_URL, ENV_GITHUB_PASSWORD, ENV_GITHUB_TOKEN, ENV_GITHUB_USER, ENV_MAX_PAGES,
  ENV_STAGING_DIR, ENV_SYNAPSE_API_KEY, ENV_SYNAPSE_BASE_URL, ENV_SYNAPSE_USERNAME,
};
use crate::error::ExportError;

/// Everything an export run needs besides the repository and table ids
#[derive(Debug, Clone)]
pub struct ExporterConfig {
  pub github_auth: GitHubAuth,
  pub github_api_url: String,
  pub synapse_auth: SynapseAuth,
  pub synapse_base_url: String,
  /// Directory for the staged CSV; the OS temp dir when unset
  pub staging_dir: Option<PathBuf>,
  /// Maximum number of issue pages fetched in one run
  pub max_pages: usize,
}

impl ExporterConfig {
  /// Load the configuration from the process environment.
  ///
  /// # Errors
  ///
  /// Returns [`ExportError::Configuration`] naming the first missing or
  /// invalid variable.
  pub fn from_env() -> Result<Self, ExportError> {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Load the configuration through an arbitrary variable lookup.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ExportError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let github_auth = github_auth(&lookup)?;
    let synapse_auth = SynapseAuth {
      username: required(&lookup, ENV_SYNAPSE_USERNAME)?,
      api_key: required(&lookup, ENV_SYNAPSE_API_KEY)?,
    };

    let max_pages = match optional(&lookup, ENV_MAX_PAGES) {
      Some(value) => parse_max_pages(&value)?,
      None => DEFAULT_MAX_PAGES,
    };

    let config = Self {
      github_auth,
      github_api_url: optional(&lookup, ENV_GITHUB_API_URL).unwrap_or_else(|| API_BASE_URL.to_string()),
      synapse_auth,
      synapse_base_url: optional(&lookup, ENV_SYNAPSE_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
      staging_dir: optional(&lookup, ENV_STAGING_DIR).map(PathBuf::from),
      max_pages,
    };
    debug!("Loaded configuration: {:?}", config);

    Ok(config)
  }

  pub fn with_max_pages(mut self, max_pages: usize) -> Result<Self, ExportError> {
    if max_pages == 0 {
      return Err(ExportError::Configuration("max pages must be at least 1".to_string()));
    }
    self.max_pages = max_pages;
    Ok(self)
  }

  pub fn with_staging_dir(mut self, staging_dir: impl Into<PathBuf>) -> Self {
    self.staging_dir = Some(staging_dir.into());
    self
  }
}

/// Token auth when `GITHUB_TOKEN` is non-empty, basic auth otherwise.
fn github_auth<F>(lookup: &F) -> Result<GitHubAuth, ExportError>
where
  F: Fn(&str) -> Option<String>,
{
  let token = lookup(ENV_GITHUB_TOKEN).ok_or_else(|| ExportError::missing_env(ENV_GITHUB_TOKEN))?;
  if !token.is_empty() {
    return Ok(GitHubAuth::Token(token));
  }

  debug!("{} is empty, falling back to basic auth", ENV_GITHUB_TOKEN);
  Ok(GitHubAuth::Basic {
    username: required(lookup, ENV_GITHUB_USER)?,
    password: required(lookup, ENV_GITHUB_PASSWORD)?,
  })
}

fn required<F>(lookup: &F, name: &str) -> Result<String, ExportError>
where
  F: Fn(&str) -> Option<String>,
{
  optional(lookup, name).ok_or_else(|| ExportError::missing_env(name))
}

/// Unset and empty variables are both treated as absent.
fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
  F: Fn(&str) -> Option<String>,
{
  lookup(name).filter(|value| !value.is_empty())
}

fn parse_max_pages(value: &str) -> Result<usize, ExportError> {
  match value.trim().parse::<usize>() {
    Ok(pages) if pages > 0 => Ok(pages),
    _ => Err(ExportError::Configuration(format!(
      "{ENV_MAX_PAGES} must be a positive integer, got '{value}'"
    ))),
  }
}
