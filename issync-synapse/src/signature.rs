//! # API Key Request Signing
//!
//! Synapse authenticates API key holders per request. Each request carries
//! the user name, a timestamp and an HMAC-SHA1 over `user + path + timestamp`
//! keyed with the base64-decoded API key.

use chrono::{SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::TableError;

type HmacSha1 = Hmac<Sha1>;

/// Current UTC time in the format Synapse expects for `signatureTimestamp`.
pub(crate) fn timestamp() -> String {
  Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Base64 signature of a request to `path` (no host, no query) made at
/// `timestamp`.
pub(crate) fn sign(username: &str, api_key: &str, path: &str, timestamp: &str) -> Result<String, TableError> {
  let key = base64::decode(api_key.trim()).map_err(|error| TableError::InvalidApiKey(error.to_string()))?;
  let mut mac = HmacSha1::new_from_slice(&key).map_err(|error| TableError::InvalidApiKey(error.to_string()))?;

  mac.update(username.as_bytes());
  mac.update(path.as_bytes());
  mac.update(timestamp.as_bytes());

  Ok(base64::encode(mac.finalize().into_bytes()))
}
