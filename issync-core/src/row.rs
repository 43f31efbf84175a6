//! Flattening of issues into export rows.

use issync_gh::{GitHubIssue, GitHubLabel};
use serde::Serialize;

/// Header line of the exported table
pub const HEADER: [&str; 7] = ["id", "Title", "Labels", "Created At", "Updated At", "URL", "Milestone"];

/// One issue flattened into the fixed table row shape.
///
/// Fields serialize in [`HEADER`] order; an absent milestone becomes an empty
/// field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
  pub id: u64,
  pub title: String,
  pub labels: String,
  pub created_at: String,
  pub updated_at: String,
  pub url: String,
  pub milestone: Option<String>,
}

impl From<&GitHubIssue> for ExportRow {
  fn from(issue: &GitHubIssue) -> Self {
    Self {
      id: issue.number,
      title: issue.title.clone(),
      labels: flatten_labels(&issue.labels),
      created_at: issue.created_at.clone(),
      updated_at: issue.updated_at.clone(),
      url: issue.html_url.clone(),
      milestone: issue.milestone.as_ref().and_then(|milestone| milestone.title.clone()),
    }
  }
}

/// Label names joined by `", "`; empty when there are no labels.
pub fn flatten_labels(labels: &[GitHubLabel]) -> String {
  labels
    .iter()
    .map(|label| label.name.as_str())
    .collect::<Vec<_>>()
    .join(", ")
}
