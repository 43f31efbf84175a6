//! # GitHub HTTP Client
//!
//! HTTP client for the GitHub issues API, holding the credential variant chosen
//! at startup and applying it to every outgoing request.

use reqwest::{Client, RequestBuilder};

use crate::consts::API_BASE_URL;
use crate::models::GitHubAuth;

/// Represents a GitHub API client
pub struct GitHubClient {
  pub(crate) client: Client,
  pub(crate) base_url: String,
  pub(crate) auth: GitHubAuth,
}

impl GitHubClient {
  /// Create a new GitHub client against the public API
  pub fn new(auth: GitHubAuth) -> Self {
    Self::with_base_url(API_BASE_URL, auth)
  }

  /// Create a client against another API root, e.g. GitHub Enterprise
  pub fn with_base_url(base_url: &str, auth: GitHubAuth) -> Self {
    Self {
      client: Client::new(),
      base_url: base_url.trim_end_matches('/').to_string(),
      auth,
    }
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// First page URL of the issue list for `owner/name`.
  pub fn issues_url(&self, repo: &str) -> String {
    format!("{}/repos/{}/issues", self.base_url, repo)
  }

  /// Attach the configured credentials to a request.
  pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
    match &self.auth {
      GitHubAuth::Token(token) => request.header(reqwest::header::AUTHORIZATION, format!("token {token}")),
      GitHubAuth::Basic { username, password } => request.basic_auth(username, Some(password)),
    }
  }
}
