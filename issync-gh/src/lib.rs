//! # GitHub Issues API Client
//!
//! Provides the GitHub REST API integration issync needs: authenticated,
//! filtered fetches of a repository's issue list one page at a time, and the
//! `link` header handling that chains those pages together.

pub mod client;
pub mod consts;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod pagination;

// Re-export the client
pub use client::GitHubClient;
pub use error::GitHubError;
// Re-export models
pub use models::{GitHubAuth, GitHubIssue, GitHubLabel, GitHubMilestone, IssuePage};
pub use pagination::{PageLink, next_page_link, parse_link_header};
