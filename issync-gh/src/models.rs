use std::fmt;

use serde::Deserialize;

use crate::pagination::PageLink;

/// Credentials used for GitHub requests, chosen once at startup.
#[derive(Clone)]
pub enum GitHubAuth {
  /// Personal access token, sent as `Authorization: token ...`
  Token(String),
  /// Username and password, sent as HTTP basic auth
  Basic { username: String, password: String },
}

impl fmt::Debug for GitHubAuth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Token(_) => f.write_str("Token(***)"),
      Self::Basic { username, .. } => f
        .debug_struct("Basic")
        .field("username", username)
        .field("password", &"***")
        .finish(),
    }
  }
}

/// Represents a GitHub issue as returned by the issue list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubIssue {
  pub number: u64,
  pub title: String,
  #[serde(default)]
  pub labels: Vec<GitHubLabel>,
  pub created_at: String,
  pub updated_at: String,
  pub html_url: String,
  pub milestone: Option<GitHubMilestone>,
}

/// Represents a label attached to an issue
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubLabel {
  pub name: String,
}

/// Represents an issue milestone
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubMilestone {
  pub title: Option<String>,
}

/// One page of the issue list and the link to the page after it
#[derive(Debug)]
pub struct IssuePage {
  pub issues: Vec<GitHubIssue>,
  pub next: Option<PageLink>,
}
