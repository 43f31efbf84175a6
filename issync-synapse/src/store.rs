//! The table store seam used by the exporter.
//!
//! [`SynapseClient`] is the production implementation; tests substitute an
//! in-memory store.

use std::path::Path;

use crate::client::SynapseClient;
use crate::error::TableError;
use crate::models::{RowSet, StoreReceipt, TableEntity};

/// Operations the exporter needs from a remote table store.
#[allow(async_fn_in_trait)]
pub trait TableStore {
  /// Authenticate with the store.
  async fn login(&mut self) -> Result<(), TableError>;

  /// Ids of every row currently in `table_id`.
  async fn query_row_ids(&self, table_id: &str) -> Result<RowSet, TableError>;

  /// Delete the given rows.
  async fn delete_rows(&self, rows: &RowSet) -> Result<(), TableError>;

  /// Look up a table and its schema.
  async fn get_table(&self, table_id: &str) -> Result<TableEntity, TableError>;

  /// Append the rows of a CSV file (with a header line) to `table`.
  async fn store_csv(&self, table: &TableEntity, csv_path: &Path) -> Result<StoreReceipt, TableError>;
}

impl TableStore for SynapseClient {
  async fn login(&mut self) -> Result<(), TableError> {
    SynapseClient::login(self).await
  }

  async fn query_row_ids(&self, table_id: &str) -> Result<RowSet, TableError> {
    self.query(table_id, &format!("select id from {table_id}")).await
  }

  async fn delete_rows(&self, rows: &RowSet) -> Result<(), TableError> {
    SynapseClient::delete_rows(self, rows).await
  }

  async fn get_table(&self, table_id: &str) -> Result<TableEntity, TableError> {
    SynapseClient::get_table(self, table_id).await
  }

  async fn store_csv(&self, table: &TableEntity, csv_path: &Path) -> Result<StoreReceipt, TableError> {
    self.upload_csv(table, csv_path).await
  }
}
