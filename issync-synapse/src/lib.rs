//! # Synapse Table Client
//!
//! Provides the slice of the Synapse REST API that issync writes through:
//! signed credential checks, paged row id queries, row deletion, table schema
//! lookup and CSV uploads through the multipart file service. The
//! [`TableStore`] trait is the seam the exporter writes against.

mod client;
pub mod consts;
mod endpoints;
pub mod error;
pub mod models;
mod signature;
pub mod store;

// Re-export the client
pub use client::SynapseClient;
pub use error::TableError;
// Re-export models
pub use models::{RowReference, RowSelection, RowSet, StoreReceipt, SynapseAuth, TableEntity, UserProfile};
pub use store::TableStore;
