//! GitHub Issues API endpoint implementations.

use reqwest::{StatusCode, header};
use tracing::{debug, info, instrument, trace, warn};
use url::Url;

use crate::client::GitHubClient;
use crate::consts::{ACCEPT, ISSUE_FILTERS, USER_AGENT};
use crate::error::GitHubError;
use crate::models::{GitHubIssue, IssuePage};
use crate::pagination::next_page_link;

impl GitHubClient {
  /// Fetch one page of a repository's open issues.
  ///
  /// `url` is either the first page URL from [`GitHubClient::issues_url`] or a
  /// continuation link from a previous page. The fixed issue filters are
  /// added unless the URL already carries them. Credentials are only sent to
  /// the origin of the client's base URL.
  ///
  /// # Errors
  ///
  /// Returns [`GitHubError::UntrustedLink`] without sending anything when
  /// `url` is on another scheme, host or port than the base URL,
  /// [`GitHubError::Status`] for any status other than `200 OK`, and
  /// request or parse errors when the call fails or the body is not an issue
  /// array.
  #[instrument(skip(self), level = "debug")]
  pub async fn list_issues_page(&self, url: &str) -> Result<IssuePage, GitHubError> {
    let request_url = with_issue_filters(url)?;
    self.check_origin(&request_url)?;
    info!("GET {}", request_url);

    let request = self
      .client
      .get(request_url.clone())
      .header(header::ACCEPT, ACCEPT)
      .header(header::USER_AGENT, USER_AGENT);

    let response = self
      .authorize(request)
      .send()
      .await
      .map_err(|source| GitHubError::Request {
        url: request_url.to_string(),
        source,
      })?;

    let status = response.status();
    info!("  : => {}", status.as_u16());

    if status != StatusCode::OK {
      let error_text = response.text().await.unwrap_or_default();
      match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
          warn!("Authentication failed when accessing GitHub API")
        }
        _ => warn!("Unexpected GitHub API error: HTTP {} - {}", status, error_text),
      }
      return Err(GitHubError::Status {
        status: status.as_u16(),
        url: request_url.to_string(),
      });
    }

    let next = next_page_link(
      response
        .headers()
        .get(header::LINK)
        .and_then(|value| value.to_str().ok()),
    );
    debug!("Next page: {:?}", next);

    let body = response.text().await.map_err(|source| GitHubError::Request {
      url: request_url.to_string(),
      source,
    })?;
    let issues = serde_json::from_str::<Vec<GitHubIssue>>(&body).map_err(|source| GitHubError::Parse {
      url: request_url.to_string(),
      source,
    })?;
    trace!("Issues: {:?}", issues);

    Ok(IssuePage { issues, next })
  }

  fn check_origin(&self, url: &Url) -> Result<(), GitHubError> {
    let base = Url::parse(&self.base_url).map_err(|source| GitHubError::InvalidUrl {
      url: self.base_url.clone(),
      source,
    })?;

    if url.origin() != base.origin() {
      warn!("Continuation link {} leaves {}", url, self.base_url);
      return Err(GitHubError::UntrustedLink {
        url: url.to_string(),
        base_url: self.base_url.clone(),
      });
    }
    Ok(())
  }
}

/// Append the fixed issue filters to `url`, keeping any it already has.
fn with_issue_filters(url: &str) -> Result<Url, GitHubError> {
  let mut parsed = Url::parse(url).map_err(|source| GitHubError::InvalidUrl {
    url: url.to_string(),
    source,
  })?;

  let missing: Vec<(&str, &str)> = ISSUE_FILTERS
    .iter()
    .filter(|(key, _)| !parsed.query_pairs().any(|(existing, _)| existing == *key))
    .copied()
    .collect();

  if !missing.is_empty() {
    parsed.query_pairs_mut().extend_pairs(missing);
  }

  Ok(parsed)
}
