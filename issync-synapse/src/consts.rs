//! Constants for the issync-synapse client

use std::time::Duration;

/// Base URL of the production Synapse services
pub const DEFAULT_BASE_URL: &str = "https://repo-prod.prod.sagebase.org";

/// Path prefix of the repository service
pub const REPO_PATH: &str = "/repo/v1";

/// Path prefix of the file service
pub const FILE_PATH: &str = "/file/v1";

/// Signed request headers
pub const USER_ID_HEADER: &str = "userId";
pub const SIGNATURE_TIMESTAMP_HEADER: &str = "signatureTimestamp";
pub const SIGNATURE_HEADER: &str = "signature";

/// Content type of staged table uploads
pub const CSV_CONTENT_TYPE: &str = "text/csv";

pub const QUERY_BUNDLE_REQUEST: &str = "org.sagebionetworks.repo.model.table.QueryBundleRequest";
pub const UPLOAD_TO_TABLE_REQUEST: &str = "org.sagebionetworks.repo.model.table.UploadToTableRequest";
pub const MULTIPART_UPLOAD_REQUEST: &str = "org.sagebionetworks.repo.model.file.MultipartUploadRequest";

/// Query bundle part mask selecting only the query results
pub const QUERY_RESULTS_PART: u32 = 0x1;

/// Smallest part size the multipart upload accepts, except for the last part
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Most parts a single multipart upload may have
pub const MAX_PARTS: u64 = 10_000;

/// Delay between polls of a running asynchronous job
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How long to wait for an asynchronous job before giving up
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(600);
