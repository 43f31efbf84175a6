//! # Issue Exporter
//!
//! The export pipeline: page through a repository's open issues, stream each
//! page into the CSV staging file, then replace the destination table's rows
//! with the staged rows.
//!
//! Replacement is not transactional. Rows are deleted before the upload, so a
//! failed upload leaves the table empty.

use std::path::PathBuf;

use issync_gh::{GitHubClient, PageLink};
use issync_synapse::TableStore;
use tracing::{debug, info, instrument, warn};

use crate::config::ExporterConfig;
use crate::error::ExportError;
use crate::row::ExportRow;
use crate::staging::StagingTable;

/// Per-run knobs for [`IssueExporter`]
#[derive(Debug, Clone)]
pub struct ExportOptions {
  pub max_pages: usize,
  pub staging_dir: Option<PathBuf>,
}

impl From<&ExporterConfig> for ExportOptions {
  fn from(config: &ExporterConfig) -> Self {
    Self {
      max_pages: config.max_pages,
      staging_dir: config.staging_dir.clone(),
    }
  }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
  pub table_id: String,
  pub pages: usize,
  pub rows: usize,
  pub deleted: usize,
}

/// Exports one repository's issues into one table per call to [`run`].
///
/// [`run`]: IssueExporter::run
pub struct IssueExporter<'a, S: TableStore> {
  github: &'a GitHubClient,
  store: &'a mut S,
  options: ExportOptions,
}

impl<'a, S: TableStore> IssueExporter<'a, S> {
  pub fn new(github: &'a GitHubClient, store: &'a mut S, options: ExportOptions) -> Self {
    Self { github, store, options }
  }

  /// Run the full pipeline for `repo` (`owner/name`) into `table_id`.
  ///
  /// # Errors
  ///
  /// Any GitHub failure, a staging failure, or a Synapse failure other than a
  /// client error while clearing the table aborts the run.
  #[instrument(skip(self), level = "info")]
  pub async fn run(&mut self, repo: &str, table_id: &str) -> Result<ExportSummary, ExportError> {
    self.store.login().await?;

    let mut staging = StagingTable::create(self.options.staging_dir.as_deref())?;
    let pages = self.fetch_into(&self.github.issues_url(repo), &mut staging).await?;
    let staged = staging.finish()?;
    debug!("Wrote {} rows to {}", staged.rows(), staged.path().display());

    let deleted = self.clear_table(table_id).await?;

    let table = self.store.get_table(table_id).await?;
    let receipt = self.store.store_csv(&table, staged.path()).await?;
    info!("Stored {} rows in {}", receipt.rows_processed, receipt.table_id);

    Ok(ExportSummary {
      table_id: table_id.to_string(),
      pages,
      rows: staged.rows(),
      deleted,
    })
  }

  /// Follow continuation links from `first_page`, appending every issue to
  /// `staging` as each page arrives. Returns the number of pages fetched.
  pub async fn fetch_into(&self, first_page: &str, staging: &mut StagingTable) -> Result<usize, ExportError> {
    let mut next = Some(PageLink::new(first_page));
    let mut pages = 0;

    while let Some(link) = next {
      if pages == self.options.max_pages {
        warn!("Issue list still reports a next page after {} pages", pages);
        return Err(ExportError::PageLimitExceeded { limit: pages });
      }

      let page = self.github.list_issues_page(link.as_str()).await?;
      pages += 1;

      info!("  : Writing {} issues", page.issues.len());
      for issue in &page.issues {
        staging.append(&ExportRow::from(issue))?;
      }

      next = page.next;
    }

    Ok(pages)
  }

  /// Delete every existing row of `table_id`, returning how many were removed.
  ///
  /// A 4xx from Synapse while querying or deleting is treated as an empty
  /// table.
  async fn clear_table(&self, table_id: &str) -> Result<usize, ExportError> {
    let rows = match self.store.query_row_ids(table_id).await {
      Ok(rows) => rows,
      Err(error) if error.is_client_error() => {
        warn!("Could not query rows of {}, treating it as empty: {}", table_id, error);
        return Ok(0);
      }
      Err(error) => return Err(error.into()),
    };

    if rows.is_empty() {
      debug!("{} has no rows to delete", table_id);
      return Ok(0);
    }

    match self.store.delete_rows(&rows).await {
      Ok(()) => Ok(rows.rows.len()),
      Err(error) if error.is_client_error() => {
        warn!("Could not delete rows of {}, continuing: {}", table_id, error);
        Ok(0)
      }
      Err(error) => Err(error.into()),
    }
  }
}
