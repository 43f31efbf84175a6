//! # Asynchronous Jobs
//!
//! Table queries and CSV uploads run as server-side jobs: `POST {uri}/start`
//! returns a token and `GET {uri}/get/{token}` answers `202 Accepted` until
//! the job is done, then `200` with the job's response body.

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument, trace};

use crate::client::{SynapseClient, check_status};
use crate::error::TableError;
use crate::models::{AsyncJobId, AsyncJobStatus};

impl SynapseClient {
  /// Start the job at `uri` (relative to the repository service) and wait
  /// for its response.
  #[instrument(skip(self, request), level = "debug")]
  pub(crate) async fn run_async_job<Req, Resp>(&self, uri: &str, request: &Req) -> Result<Resp, TableError>
  where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
  {
    let start_url = self.repo_url(&format!("{uri}/start"));
    let response = self.authenticated(Method::POST, &start_url)?.json(request).send().await?;
    let job = check_status(response).await?.json::<AsyncJobId>().await?;
    debug!("Started job {} at {}", job.token, uri);

    let get_url = self.repo_url(&format!("{uri}/get/{}", job.token));
    let started = Instant::now();

    loop {
      let response = self.authenticated(Method::GET, &get_url)?.send().await?;

      if response.status() != StatusCode::ACCEPTED {
        let body = check_status(response).await?.text().await?;
        if let Ok(status) = serde_json::from_str::<AsyncJobStatus>(&body)
          && status.job_state.as_deref() == Some("FAILED")
        {
          return Err(TableError::JobFailed {
            message: status.error_message.unwrap_or_else(|| "no error message".to_string()),
          });
        }
        trace!("Job {} response: {}", job.token, body);
        return serde_json::from_str::<Resp>(&body).map_err(|error| TableError::JobFailed {
          message: format!("unexpected job response: {error}"),
        });
      }

      let status = response.json::<AsyncJobStatus>().await?;
      if status.job_state.as_deref() == Some("FAILED") {
        return Err(TableError::JobFailed {
          message: status.error_message.unwrap_or_else(|| "no error message".to_string()),
        });
      }
      debug!(
        "Job {} still {}: {}",
        job.token,
        status.job_state.as_deref().unwrap_or("PROCESSING"),
        status.progress_message.as_deref().unwrap_or("")
      );

      if started.elapsed() >= self.job_timeout {
        return Err(TableError::JobTimeout {
          token: job.token,
          waited_secs: self.job_timeout.as_secs(),
        });
      }
      sleep(self.poll_interval).await;
    }
  }
}
