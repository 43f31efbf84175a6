//! Constants for the issync-gh client

/// Base URL for the official SaaS GitHub API
pub const API_BASE_URL: &str = "https://api.github.com";

/// User-Agent header value sent with every issues request
pub const USER_AGENT: &str = "GitHub issue exporter";

/// Accept header value for the GitHub API
pub const ACCEPT: &str = "application/vnd.github.v3.raw+json";

/// Query filters applied to every issue list request.
pub const ISSUE_FILTERS: [(&str, &str); 3] = [("filter", "all"), ("state", "open"), ("type", "issue")];
