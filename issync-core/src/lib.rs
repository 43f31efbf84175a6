//! # issync Core Library
//!
//! The issue export pipeline: load configuration, page through a repository's
//! open issues, flatten each one into a fixed row, stage the rows in a CSV
//! file and replace the destination Synapse table's rows with them.

pub mod config;
pub mod consts;
pub mod error;
pub mod exporter;
pub mod handler;
pub mod row;
pub mod staging;

pub use config::ExporterConfig;
pub use error::ExportError;
pub use exporter::{ExportOptions, ExportSummary, IssueExporter};
pub use handler::{ExportEvent, HandlerResponse, issues_to_table_handler, run_export};
pub use row::{ExportRow, HEADER};
pub use staging::{StagedTable, StagingTable};
