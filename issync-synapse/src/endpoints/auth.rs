//! Credential check for the Synapse API.

use reqwest::Method;
use tracing::{debug, info, instrument};

use crate::client::{SynapseClient, check_status};
use crate::error::TableError;
use crate::models::UserProfile;

impl SynapseClient {
  /// Verify the username and API key by fetching the caller's profile.
  ///
  /// Every later call is signed with the same credentials; this only makes
  /// bad credentials fail before any table is touched.
  #[instrument(skip(self), level = "debug")]
  pub async fn login(&mut self) -> Result<(), TableError> {
    info!("Logging in to Synapse as {}", self.auth.username);

    let url = self.repo_url("/userProfile");
    let response = self.signed(Method::GET, &url)?.send().await?;
    let profile = check_status(response).await?.json::<UserProfile>().await?;
    debug!("Synapse user id {} ({:?})", profile.owner_id, profile.user_name);

    self.profile = Some(profile);
    Ok(())
  }
}
