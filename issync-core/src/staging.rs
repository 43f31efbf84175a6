//! # CSV Staging Buffer
//!
//! Rows are streamed into a named temporary `.csv` file page by page and the
//! finished file is handed to the table store for upload. The file is removed
//! when the staging value is dropped, whether or not the run succeeded.

use std::fs::File;
use std::path::Path;

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::row::{ExportRow, HEADER};

/// A staging file still being written
pub struct StagingTable {
  file: NamedTempFile,
  writer: csv::Writer<File>,
  rows: usize,
}

impl StagingTable {
  /// Create a staging file with the header line already written.
  ///
  /// The file lives in `dir` when given, otherwise in the OS temp directory.
  pub fn create(dir: Option<&Path>) -> Result<Self, csv::Error> {
    let mut builder = Builder::new();
    builder.prefix("issync-").suffix(".csv");
    let file = match dir {
      Some(dir) => builder.tempfile_in(dir)?,
      None => builder.tempfile()?,
    };
    debug!("Staging rows in {}", file.path().display());

    let mut writer = csv::WriterBuilder::new()
      .has_headers(false)
      .from_writer(file.reopen()?);
    writer.write_record(HEADER)?;

    Ok(Self { file, writer, rows: 0 })
  }

  pub fn append(&mut self, row: &ExportRow) -> Result<(), csv::Error> {
    self.writer.serialize(row)?;
    self.rows += 1;
    Ok(())
  }

  pub fn path(&self) -> &Path {
    self.file.path()
  }

  /// Number of rows appended so far, excluding the header.
  pub fn len(&self) -> usize {
    self.rows
  }

  pub fn is_empty(&self) -> bool {
    self.rows == 0
  }

  /// Flush all buffered rows to disk.
  pub fn finish(self) -> Result<StagedTable, csv::Error> {
    let Self { file, mut writer, rows } = self;
    writer.flush()?;
    drop(writer);

    Ok(StagedTable { file, rows })
  }
}

/// A fully written staging file, ready for upload
pub struct StagedTable {
  file: NamedTempFile,
  rows: usize,
}

impl StagedTable {
  pub fn path(&self) -> &Path {
    self.file.path()
  }

  pub fn rows(&self) -> usize {
    self.rows
  }
}
