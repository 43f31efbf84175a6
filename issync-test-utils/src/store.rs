//! In-memory [`TableStore`] for exercising the export pipeline without a
//! Synapse server.

use std::path::Path;
use std::sync::Mutex;

use issync_synapse::{RowReference, RowSet, StoreReceipt, TableEntity, TableError, TableStore};

#[derive(Default)]
struct State {
  header: Option<Vec<String>>,
  rows: Vec<(u64, Vec<String>)>,
  next_row_id: u64,
  mutations: usize,
}

/// A single table held in memory
pub struct MemoryTableStore {
  table_id: String,
  logged_in: bool,
  fail_query_with: Option<u16>,
  fail_delete_with: Option<u16>,
  state: Mutex<State>,
}

impl MemoryTableStore {
  /// An empty table called `table_id`
  pub fn new(table_id: &str) -> Self {
    Self::with_rows(table_id, Vec::new())
  }

  /// A table pre-populated with `rows`
  pub fn with_rows(table_id: &str, rows: Vec<Vec<String>>) -> Self {
    let rows: Vec<(u64, Vec<String>)> = rows.into_iter().zip(1..).map(|(values, id)| (id, values)).collect();
    let state = State {
      next_row_id: rows.len() as u64 + 1,
      rows,
      ..State::default()
    };

    Self {
      table_id: table_id.to_string(),
      logged_in: false,
      fail_query_with: None,
      fail_delete_with: None,
      state: Mutex::new(state),
    }
  }

  /// Make every row query fail with the given HTTP status
  pub fn fail_query_with(mut self, status: u16) -> Self {
    self.fail_query_with = Some(status);
    self
  }

  /// Make every delete call fail with the given HTTP status
  pub fn fail_delete_with(mut self, status: u16) -> Self {
    self.fail_delete_with = Some(status);
    self
  }

  pub fn is_logged_in(&self) -> bool {
    self.logged_in
  }

  /// Row values currently in the table, in insertion order
  pub fn rows(&self) -> Vec<Vec<String>> {
    self.lock().rows.iter().map(|(_, values)| values.clone()).collect()
  }

  /// Header of the last uploaded CSV
  pub fn header(&self) -> Option<Vec<String>> {
    self.lock().header.clone()
  }

  /// Number of delete and upload calls made so far
  pub fn mutation_count(&self) -> usize {
    self.lock().mutations
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, State> {
    self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn check_table(&self, table_id: &str) -> Result<(), TableError> {
    if !self.logged_in {
      return Err(TableError::NotLoggedIn);
    }
    if table_id != self.table_id {
      return Err(TableError::Http {
        status: 404,
        reason: format!("The entity {table_id} does not exist"),
      });
    }
    Ok(())
  }
}

impl TableStore for MemoryTableStore {
  async fn login(&mut self) -> Result<(), TableError> {
    self.logged_in = true;
    Ok(())
  }

  async fn query_row_ids(&self, table_id: &str) -> Result<RowSet, TableError> {
    self.check_table(table_id)?;
    if let Some(status) = self.fail_query_with {
      return Err(TableError::Http {
        status,
        reason: "query rejected".to_string(),
      });
    }
    let rows = self
      .lock()
      .rows
      .iter()
      .map(|(row_id, _)| RowReference {
        row_id: *row_id,
        version_number: Some(1),
      })
      .collect();

    Ok(RowSet {
      table_id: table_id.to_string(),
      etag: None,
      rows,
    })
  }

  async fn delete_rows(&self, rows: &RowSet) -> Result<(), TableError> {
    self.check_table(&rows.table_id)?;
    let mut state = self.lock();
    state.mutations += 1;

    if let Some(status) = self.fail_delete_with {
      return Err(TableError::Http {
        status,
        reason: "delete rejected".to_string(),
      });
    }

    state
      .rows
      .retain(|(row_id, _)| !rows.rows.iter().any(|row| row.row_id == *row_id));
    Ok(())
  }

  async fn get_table(&self, table_id: &str) -> Result<TableEntity, TableError> {
    self.check_table(table_id)?;
    Ok(TableEntity {
      id: self.table_id.clone(),
      name: Some("issues".to_string()),
      column_ids: (1..=7).map(|id| id.to_string()).collect(),
    })
  }

  async fn store_csv(&self, table: &TableEntity, csv_path: &Path) -> Result<StoreReceipt, TableError> {
    self.check_table(&table.id)?;

    let io_error = |source: std::io::Error| TableError::Io {
      path: csv_path.to_path_buf(),
      source,
    };
    let mut reader = csv::Reader::from_path(csv_path).map_err(|error| io_error(error.into()))?;
    let header: Vec<String> = reader
      .headers()
      .map_err(|error| io_error(error.into()))?
      .iter()
      .map(str::to_string)
      .collect();

    let mut state = self.lock();
    state.mutations += 1;
    state.header = Some(header);

    let mut processed = 0;
    for record in reader.records() {
      let values = record
        .map_err(|error| io_error(error.into()))?
        .iter()
        .map(str::to_string)
        .collect();
      let row_id = state.next_row_id;
      state.next_row_id += 1;
      state.rows.push((row_id, values));
      processed += 1;
    }

    Ok(StoreReceipt {
      table_id: table.id.clone(),
      rows_processed: processed,
    })
  }
}
