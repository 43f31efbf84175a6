use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{MULTIPART_UPLOAD_REQUEST, QUERY_BUNDLE_REQUEST, QUERY_RESULTS_PART, UPLOAD_TO_TABLE_REQUEST};

/// Represents Synapse authentication credentials
#[derive(Clone)]
pub struct SynapseAuth {
  pub username: String,
  pub api_key: String,
}

impl fmt::Debug for SynapseAuth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SynapseAuth")
      .field("username", &self.username)
      .field("api_key", &"***")
      .finish()
  }
}

/// Profile of the signed-in user
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub owner_id: String,
  pub user_name: Option<String>,
}

/// Error body returned by Synapse on failed calls
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
  pub reason: Option<String>,
}

/// Handle of a started asynchronous job
#[derive(Debug, Deserialize)]
pub(crate) struct AsyncJobId {
  pub token: String,
}

/// Body of a job that has not finished yet
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AsyncJobStatus {
  pub job_state: Option<String>,
  pub progress_message: Option<String>,
  pub error_message: Option<String>,
}

/// Reference to a single table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowReference {
  pub row_id: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version_number: Option<u64>,
}

/// Set of rows returned by a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSet {
  pub table_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub etag: Option<String>,
  #[serde(default)]
  pub rows: Vec<RowReference>,
}

impl RowSet {
  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}

/// Row ids to delete, as accepted by `deleteRows`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSelection {
  pub table_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub etag: Option<String>,
  pub row_ids: Vec<u64>,
}

impl From<&RowSet> for RowSelection {
  fn from(rows: &RowSet) -> Self {
    Self {
      table_id: rows.table_id.clone(),
      etag: rows.etag.clone(),
      row_ids: rows.rows.iter().map(|row| row.row_id).collect(),
    }
  }
}

#[derive(Debug, Serialize)]
pub(crate) struct Query<'a> {
  pub sql: &'a str,
}

/// Start request of a table query job
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryBundleRequest<'a> {
  pub concrete_type: &'static str,
  pub entity_id: &'a str,
  pub query: Query<'a>,
  pub part_mask: u32,
}

impl<'a> QueryBundleRequest<'a> {
  pub fn new(table_id: &'a str, sql: &'a str) -> Self {
    Self {
      concrete_type: QUERY_BUNDLE_REQUEST,
      entity_id: table_id,
      query: Query { sql },
      part_mask: QUERY_RESULTS_PART,
    }
  }
}

/// Continuation token of a paged query, sent back verbatim for the next page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryNextPageToken {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub concrete_type: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub entity_id: Option<String>,
  pub token: String,
}

/// One page of query results
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryResult {
  pub query_results: RowSet,
  pub next_page_token: Option<QueryNextPageToken>,
}

/// Response of the first query page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryResultBundle {
  pub query_result: QueryResult,
}

/// Represents a Synapse table entity and its column schema
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableEntity {
  pub id: String,
  pub name: Option<String>,
  #[serde(default)]
  pub column_ids: Vec<String>,
}

/// Parsing options for an uploaded CSV file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CsvTableDescriptor {
  pub is_first_line_header: bool,
  pub separator: &'static str,
  pub quote_character: &'static str,
  pub escape_character: &'static str,
  pub line_end: &'static str,
}

impl Default for CsvTableDescriptor {
  fn default() -> Self {
    Self {
      is_first_line_header: true,
      separator: ",",
      quote_character: "\"",
      escape_character: "\\",
      line_end: "\n",
    }
  }
}

/// Start request of a CSV append job
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadToTableRequest<'a> {
  pub concrete_type: &'static str,
  pub entity_id: &'a str,
  pub table_id: &'a str,
  pub upload_file_handle_id: &'a str,
  pub lines_to_skip: u64,
  pub csv_table_descriptor: CsvTableDescriptor,
}

impl<'a> UploadToTableRequest<'a> {
  pub fn new(table_id: &'a str, file_handle_id: &'a str) -> Self {
    Self {
      concrete_type: UPLOAD_TO_TABLE_REQUEST,
      entity_id: table_id,
      table_id,
      upload_file_handle_id: file_handle_id,
      lines_to_skip: 0,
      csv_table_descriptor: CsvTableDescriptor::default(),
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadToTableResult {
  #[serde(default)]
  pub rows_processed: u64,
  pub etag: Option<String>,
}

/// Result of a CSV upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReceipt {
  pub table_id: String,
  pub rows_processed: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MultipartUploadRequest<'a> {
  pub concrete_type: &'static str,
  #[serde(rename = "contentMD5Hex")]
  pub content_md5_hex: String,
  pub file_name: &'a str,
  pub content_type: &'a str,
  pub part_size_bytes: u64,
  pub file_size_bytes: u64,
  pub generate_preview: bool,
}

impl<'a> MultipartUploadRequest<'a> {
  pub fn new(
    file_name: &'a str,
    content_type: &'a str,
    content_md5_hex: String,
    file_size_bytes: u64,
    part_size_bytes: u64,
  ) -> Self {
    Self {
      concrete_type: MULTIPART_UPLOAD_REQUEST,
      content_md5_hex,
      file_name,
      content_type,
      part_size_bytes,
      file_size_bytes,
      generate_preview: false,
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MultipartUploadStatus {
  pub upload_id: String,
  pub state: String,
  /// One character per part, `1` when the part is already stored
  #[serde(default)]
  pub parts_state: String,
  pub result_file_handle_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchPresignedUploadUrlRequest<'a> {
  pub upload_id: &'a str,
  pub part_numbers: Vec<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PartPresignedUrl {
  pub part_number: u64,
  pub upload_presigned_url: String,
  #[serde(default)]
  pub signed_headers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchPresignedUploadUrlResponse {
  #[serde(default)]
  pub part_presigned_urls: Vec<PartPresignedUrl>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddPartResponse {
  pub add_part_state: String,
  pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_synapse_auth_debug_hides_api_key() {
    let auth = SynapseAuth {
      username: "test_user".to_string(),
      api_key: "c2VjcmV0".to_string(),
    };

    let rendered = format!("{auth:?}");
    assert!(rendered.contains("test_user"));
    assert!(!rendered.contains("c2VjcmV0"));
  }

  #[test]
  fn test_row_set_deserialization() {
    let json = json!({
        "concreteType": "org.sagebionetworks.repo.model.table.RowSet",
        "tableId": "syn123",
        "etag": "a1b2",
        "headers": [{"name": "id"}],
        "rows": [
            {"rowId": 1, "versionNumber": 3, "values": ["12"]},
            {"rowId": 2, "versionNumber": 3, "values": ["13"]}
        ]
    });

    let rows: RowSet = serde_json::from_value(json).unwrap();

    assert_eq!(rows.table_id, "syn123");
    assert_eq!(rows.etag, Some("a1b2".to_string()));
    assert_eq!(rows.rows.len(), 2);
    assert_eq!(rows.rows[1].row_id, 2);
  }

  #[test]
  fn test_empty_row_set_deserialization() {
    let rows: RowSet = serde_json::from_value(json!({"tableId": "syn123"})).unwrap();

    assert!(rows.is_empty());
    assert_eq!(rows.etag, None);
  }

  #[test]
  fn test_row_selection_from_row_set() {
    let rows = RowSet {
      table_id: "syn123".to_string(),
      etag: Some("etag-1".to_string()),
      rows: vec![
        RowReference {
          row_id: 4,
          version_number: Some(2),
        },
        RowReference {
          row_id: 9,
          version_number: None,
        },
      ],
    };

    assert_eq!(
      serde_json::to_value(RowSelection::from(&rows)).unwrap(),
      json!({"tableId": "syn123", "etag": "etag-1", "rowIds": [4, 9]})
    );
  }

  #[test]
  fn test_query_bundle_request_serialization() {
    assert_eq!(
      serde_json::to_value(QueryBundleRequest::new("syn123", "select id from syn123")).unwrap(),
      json!({
          "concreteType": "org.sagebionetworks.repo.model.table.QueryBundleRequest",
          "entityId": "syn123",
          "query": {"sql": "select id from syn123"},
          "partMask": 1
      })
    );
  }

  #[test]
  fn test_query_result_bundle_with_next_page() {
    let json = json!({
        "concreteType": "org.sagebionetworks.repo.model.table.QueryResultBundle",
        "queryResult": {
            "concreteType": "org.sagebionetworks.repo.model.table.QueryResult",
            "queryResults": {"tableId": "syn123", "etag": "e", "rows": [{"rowId": 1, "versionNumber": 1}]},
            "nextPageToken": {
                "concreteType": "org.sagebionetworks.repo.model.table.QueryNextPageToken",
                "entityId": "syn123",
                "token": "page-2"
            }
        }
    });

    let bundle: QueryResultBundle = serde_json::from_value(json).unwrap();

    assert_eq!(bundle.query_result.query_results.rows.len(), 1);
    let token = bundle.query_result.next_page_token.unwrap();
    assert_eq!(token.token, "page-2");
    assert_eq!(
      serde_json::to_value(&token).unwrap(),
      json!({
          "concreteType": "org.sagebionetworks.repo.model.table.QueryNextPageToken",
          "entityId": "syn123",
          "token": "page-2"
      })
    );
  }

  #[test]
  fn test_upload_to_table_request_serialization() {
    assert_eq!(
      serde_json::to_value(UploadToTableRequest::new("syn123", "777")).unwrap(),
      json!({
          "concreteType": "org.sagebionetworks.repo.model.table.UploadToTableRequest",
          "entityId": "syn123",
          "tableId": "syn123",
          "uploadFileHandleId": "777",
          "linesToSkip": 0,
          "csvTableDescriptor": {
              "isFirstLineHeader": true,
              "separator": ",",
              "quoteCharacter": "\"",
              "escapeCharacter": "\\",
              "lineEnd": "\n"
          }
      })
    );
  }

  #[test]
  fn test_multipart_upload_request_serialization() {
    let request = MultipartUploadRequest::new("issues.csv", "text/csv", "abc".to_string(), 17, 5_242_880);

    assert_eq!(
      serde_json::to_value(&request).unwrap(),
      json!({
          "concreteType": "org.sagebionetworks.repo.model.file.MultipartUploadRequest",
          "contentMD5Hex": "abc",
          "fileName": "issues.csv",
          "contentType": "text/csv",
          "partSizeBytes": 5_242_880,
          "fileSizeBytes": 17,
          "generatePreview": false
      })
    );
  }

  #[test]
  fn test_table_entity_deserialization() {
    let json = json!({
        "id": "syn123",
        "name": "Open issues",
        "concreteType": "org.sagebionetworks.repo.model.table.TableEntity",
        "columnIds": ["101", "102", "103"]
    });

    let table: TableEntity = serde_json::from_value(json).unwrap();

    assert_eq!(table.id, "syn123");
    assert_eq!(table.column_ids, vec!["101", "102", "103"]);
  }
}
