//! Test utilities shared across the issync workspace
//!
//! This crate provides common testing infrastructure including:
//! - Environment variable isolation ([`EnvVarGuard`])
//! - GitHub issue and `link` header fixtures ([`issue_json`], [`link_header`])
//! - An in-memory table store ([`MemoryTableStore`])
//!
//! The clippy dead_code lint is disabled for this crate because test utilities
//! may not be used by all tests, and the compiler cannot detect usage across
//! crate boundaries in development dependencies.

#![allow(dead_code)]

pub mod env;
pub mod fixtures;
pub mod store;

// Re-export commonly used items
pub use env::EnvVarGuard;
pub use fixtures::{issue_json, link_header};
pub use store::MemoryTableStore;
