//! # GitHub API Endpoints
//!
//! Endpoint implementations for the GitHub resources issync reads.

pub mod issues;
