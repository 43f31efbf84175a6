//! Constants for the issync pipeline
//!
//! Environment variable names and defaults used when loading
//! [`crate::ExporterConfig`].

/// GitHub personal access token; an empty value selects basic auth
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// GitHub username for basic auth
pub const ENV_GITHUB_USER: &str = "GITHUB_USER";

/// GitHub password for basic auth
pub const ENV_GITHUB_PASSWORD: &str = "GITHUB_PASSWORD";

/// Synapse account name
pub const ENV_SYNAPSE_USERNAME: &str = "SYNAPSE_USERNAME";

/// Synapse API key
pub const ENV_SYNAPSE_API_KEY: &str = "SYNAPSE_API_KEY";

/// Optional GitHub API root override
pub const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";

/// Optional Synapse service root override
pub const ENV_SYNAPSE_BASE_URL: &str = "SYNAPSE_BASE_URL";

/// Optional directory for the staged CSV file
pub const ENV_STAGING_DIR: &str = "ISSYNC_STAGING_DIR";

/// Optional cap on the number of issue pages fetched per run
pub const ENV_MAX_PAGES: &str = "ISSYNC_MAX_PAGES";

/// Default cap on the number of issue pages fetched per run
pub const DEFAULT_MAX_PAGES: usize = 1000;
