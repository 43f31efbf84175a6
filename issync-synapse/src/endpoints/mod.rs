//! # Synapse API Endpoints
//!
//! Endpoint implementations for the credential check, asynchronous jobs,
//! multipart file uploads and table row operations.

mod auth;
mod files;
mod jobs;
mod tables;
