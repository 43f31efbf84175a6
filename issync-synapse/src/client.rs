use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use tracing::warn;

use crate::consts::{
  DEFAULT_BASE_URL, DEFAULT_JOB_TIMEOUT, DEFAULT_POLL_INTERVAL, FILE_PATH, REPO_PATH, SIGNATURE_HEADER,
  SIGNATURE_TIMESTAMP_HEADER, USER_ID_HEADER,
};
use crate::error::TableError;
use crate::models::{ErrorBody, SynapseAuth, UserProfile};
use crate::signature;

/// Represents a Synapse API client
pub struct SynapseClient {
  pub(crate) client: Client,
  pub(crate) base_url: String,
  pub(crate) auth: SynapseAuth,
  pub(crate) profile: Option<UserProfile>,
  pub(crate) poll_interval: Duration,
  pub(crate) job_timeout: Duration,
}

impl SynapseClient {
  /// Create a new Synapse client; call `login` before any table operation
  pub fn new(base_url: &str, auth: SynapseAuth) -> Self {
    Self {
      client: Client::new(),
      base_url: base_url.trim_end_matches('/').to_string(),
      auth,
      profile: None,
      poll_interval: DEFAULT_POLL_INTERVAL,
      job_timeout: DEFAULT_JOB_TIMEOUT,
    }
  }

  /// Create a client against the production Synapse service
  pub fn production(auth: SynapseAuth) -> Self {
    Self::new(DEFAULT_BASE_URL, auth)
  }

  /// Change how often and how long asynchronous jobs are polled
  pub fn with_job_polling(mut self, poll_interval: Duration, job_timeout: Duration) -> Self {
    self.poll_interval = poll_interval;
    self.job_timeout = job_timeout;
    self
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn is_logged_in(&self) -> bool {
    self.profile.is_some()
  }

  /// Profile of the signed-in user, once logged in
  pub fn profile(&self) -> Option<&UserProfile> {
    self.profile.as_ref()
  }

  pub(crate) fn repo_url(&self, path: &str) -> String {
    format!("{}{}{}", self.base_url, REPO_PATH, path)
  }

  pub(crate) fn file_url(&self, path: &str) -> String {
    format!("{}{}{}", self.base_url, FILE_PATH, path)
  }

  /// Build a request to `url` carrying the API key signature headers.
  pub(crate) fn signed(&self, method: Method, url: &str) -> Result<RequestBuilder, TableError> {
    let parsed = Url::parse(url).map_err(|source| TableError::InvalidUrl {
      url: url.to_string(),
      source,
    })?;
    let timestamp = signature::timestamp();
    let signature = signature::sign(&self.auth.username, &self.auth.api_key, parsed.path(), &timestamp)?;

    Ok(
      self
        .client
        .request(method, parsed)
        .header(USER_ID_HEADER, &self.auth.username)
        .header(SIGNATURE_TIMESTAMP_HEADER, timestamp)
        .header(SIGNATURE_HEADER, signature),
    )
  }

  /// Signed request that requires a prior successful login.
  pub(crate) fn authenticated(&self, method: Method, url: &str) -> Result<RequestBuilder, TableError> {
    if !self.is_logged_in() {
      return Err(TableError::NotLoggedIn);
    }
    self.signed(method, url)
  }
}

/// Pass successful responses through, turn everything else into
/// [`TableError::Http`].
pub(crate) async fn check_status(response: Response) -> Result<Response, TableError> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body = response.text().await.unwrap_or_default();
  let reason = serde_json::from_str::<ErrorBody>(&body)
    .ok()
    .and_then(|error| error.reason)
    .unwrap_or(body);
  warn!("Synapse API error: HTTP {} - {}", status, reason);

  Err(TableError::Http {
    status: status.as_u16(),
    reason,
  })
}
