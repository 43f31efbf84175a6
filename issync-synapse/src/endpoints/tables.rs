//! # Synapse Table Endpoints
//!
//! Row queries, row deletion, schema lookup and CSV uploads for Synapse
//! tables. Every call requires a successful [`SynapseClient::login`].

use std::path::Path;

use reqwest::Method;
use tracing::{debug, info, instrument, trace};

use crate::client::{SynapseClient, check_status};
use crate::consts::CSV_CONTENT_TYPE;
use crate::error::TableError;
use crate::models::{
  QueryBundleRequest, QueryResult, QueryResultBundle, RowSelection, RowSet, StoreReceipt, TableEntity,
  UploadToTableRequest, UploadToTableResult,
};

impl SynapseClient {
  /// Fetch a table entity, including the column ids that make up its schema.
  #[instrument(skip(self), level = "debug")]
  pub async fn get_table(&self, table_id: &str) -> Result<TableEntity, TableError> {
    let url = self.repo_url(&format!("/entity/{table_id}"));

    let response = self.authenticated(Method::GET, &url)?.send().await?;
    let table = check_status(response).await?.json::<TableEntity>().await?;
    trace!("Table: {:?}", table);

    Ok(table)
  }

  /// Run a SQL query against a table and return the row references of every
  /// result page.
  #[instrument(skip(self), level = "debug")]
  pub async fn query(&self, table_id: &str, sql: &str) -> Result<RowSet, TableError> {
    debug!("Querying {}: {}", table_id, sql);

    let bundle: QueryResultBundle = self
      .run_async_job(
        &format!("/entity/{table_id}/table/query/async"),
        &QueryBundleRequest::new(table_id, sql),
      )
      .await?;

    let QueryResult {
      query_results: mut rows,
      mut next_page_token,
    } = bundle.query_result;

    while let Some(token) = next_page_token {
      debug!("Fetching next query page of {} ({} rows so far)", table_id, rows.rows.len());
      let page: QueryResult = self
        .run_async_job(&format!("/entity/{table_id}/table/query/nextPage/async"), &token)
        .await?;

      rows.rows.extend(page.query_results.rows);
      next_page_token = page.next_page_token;
    }
    debug!("Query returned {} rows", rows.rows.len());

    Ok(rows)
  }

  /// Delete every row in `rows` from its table.
  #[instrument(skip(self, rows), fields(table_id = %rows.table_id, count = rows.rows.len()), level = "debug")]
  pub async fn delete_rows(&self, rows: &RowSet) -> Result<(), TableError> {
    let url = self.repo_url(&format!("/entity/{}/table/deleteRows", rows.table_id));
    info!("Deleting {} rows from {}", rows.rows.len(), rows.table_id);

    let response = self
      .authenticated(Method::POST, &url)?
      .json(&RowSelection::from(rows))
      .send()
      .await?;
    check_status(response).await?;

    Ok(())
  }

  /// Append the rows of a CSV file with a header line to `table`.
  ///
  /// The file is uploaded to Synapse file storage first, then appended by an
  /// upload job that matches header names to the table's columns.
  #[instrument(skip(self, table), fields(table_id = %table.id), level = "debug")]
  pub async fn upload_csv(&self, table: &TableEntity, csv_path: &Path) -> Result<StoreReceipt, TableError> {
    let content = tokio::fs::read(csv_path).await.map_err(|source| TableError::Io {
      path: csv_path.to_path_buf(),
      source,
    })?;
    let file_name = csv_path
      .file_name()
      .and_then(|name| name.to_str())
      .unwrap_or("issues.csv");
    info!("Uploading {} bytes from {} to {}", content.len(), csv_path.display(), table.id);

    let file_handle_id = self.upload_file(file_name, CSV_CONTENT_TYPE, &content).await?;

    let result: UploadToTableResult = self
      .run_async_job(
        &format!("/entity/{}/table/upload/csv/async", table.id),
        &UploadToTableRequest::new(&table.id, &file_handle_id),
      )
      .await?;
    debug!(
      "Synapse processed {} rows, table etag now {:?}",
      result.rows_processed, result.etag
    );

    Ok(StoreReceipt {
      table_id: table.id.clone(),
      rows_processed: result.rows_processed,
    })
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;
  use std::time::Duration;

  use serde_json::json;
  use wiremock::matchers::{body_json, header, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use crate::client::SynapseClient;
  use crate::error::TableError;
  use crate::models::{RowReference, RowSet, SynapseAuth, TableEntity, UserProfile};

  fn logged_in_client(base_url: &str) -> SynapseClient {
    let auth = SynapseAuth {
      username: "test_user".to_string(),
      api_key: "aXNzeW5jLXRlc3Qtc2VjcmV0".to_string(),
    };
    let mut client =
      SynapseClient::new(base_url, auth).with_job_polling(Duration::from_millis(5), Duration::from_secs(5));
    client.profile = Some(UserProfile {
      owner_id: "1".to_string(),
      user_name: Some("test_user".to_string()),
    });
    client
  }

  fn row_set(table_id: &str, etag: Option<&str>, ids: &[u64]) -> serde_json::Value {
    let rows: Vec<_> = ids
      .iter()
      .map(|id| json!({"rowId": id, "versionNumber": 1, "values": [id.to_string()]}))
      .collect();
    json!({"tableId": table_id, "etag": etag, "headers": [{"name": "id"}], "rows": rows})
  }

  #[tokio::test]
  async fn test_get_table() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = logged_in_client(&mock_server.uri());

    Mock::given(method("GET"))
      .and(path("/repo/v1/entity/syn123"))
      .and(header("userId", "test_user"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
          "id": "syn123",
          "name": "Issues",
          "columnIds": ["1", "2", "3", "4", "5", "6", "7"]
      })))
      .mount(&mock_server)
      .await;

    let table = client.get_table("syn123").await?;

    assert_eq!(table.id, "syn123");
    assert_eq!(table.column_ids.len(), 7);
    Ok(())
  }

  #[tokio::test]
  async fn test_query_follows_next_page_tokens() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = logged_in_client(&mock_server.uri());

    Mock::given(method("POST"))
      .and(path("/repo/v1/entity/syn123/table/query/async/start"))
      .and(body_json(json!({
          "concreteType": "org.sagebionetworks.repo.model.table.QueryBundleRequest",
          "entityId": "syn123",
          "query": {"sql": "select id from syn123"},
          "partMask": 1
      })))
      .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token": "q1"})))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("GET"))
      .and(path("/repo/v1/entity/syn123/table/query/async/get/q1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
          "queryResult": {
              "queryResults": row_set("syn123", Some("etag-1"), &[1, 2]),
              "nextPageToken": {
                  "concreteType": "org.sagebionetworks.repo.model.table.QueryNextPageToken",
                  "entityId": "syn123",
                  "token": "next-a"
              }
          }
      })))
      .expect(1)
      .mount(&mock_server)
      .await;

    Mock::given(method("POST"))
      .and(path("/repo/v1/entity/syn123/table/query/nextPage/async/start"))
      .and(body_json(json!({
          "concreteType": "org.sagebionetworks.repo.model.table.QueryNextPageToken",
          "entityId": "syn123",
          "token": "next-a"
      })))
      .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token": "q2"})))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("GET"))
      .and(path("/repo/v1/entity/syn123/table/query/nextPage/async/get/q2"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
          "queryResults": row_set("syn123", Some("etag-1"), &[3])
      })))
      .expect(1)
      .mount(&mock_server)
      .await;

    let rows = client.query("syn123", "select id from syn123").await?;

    let ids: Vec<u64> = rows.rows.iter().map(|row| row.row_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(rows.etag.as_deref(), Some("etag-1"));
    Ok(())
  }

  #[tokio::test]
  async fn test_query_server_error_is_not_client_error() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = logged_in_client(&mock_server.uri());

    Mock::given(method("POST"))
      .and(path("/repo/v1/entity/syn123/table/query/async/start"))
      .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
      .mount(&mock_server)
      .await;

    let error = client.query("syn123", "select id from syn123").await.unwrap_err();

    assert!(!error.is_client_error());
    assert!(error.to_string().contains("Service Unavailable"));
    Ok(())
  }

  #[tokio::test]
  async fn test_delete_rows_sends_row_selection() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = logged_in_client(&mock_server.uri());

    let rows = RowSet {
      table_id: "syn123".to_string(),
      etag: Some("etag-1".to_string()),
      rows: vec![
        RowReference {
          row_id: 1,
          version_number: Some(1),
        },
        RowReference {
          row_id: 5,
          version_number: Some(2),
        },
      ],
    };

    Mock::given(method("POST"))
      .and(path("/repo/v1/entity/syn123/table/deleteRows"))
      .and(body_json(json!({"tableId": "syn123", "etag": "etag-1", "rowIds": [1, 5]})))
      .respond_with(ResponseTemplate::new(201).set_body_json(json!({"tableId": "syn123", "rows": []})))
      .expect(1)
      .mount(&mock_server)
      .await;

    client.delete_rows(&rows).await?;
    Ok(())
  }

  #[tokio::test]
  async fn test_delete_rows_client_error() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = logged_in_client(&mock_server.uri());

    let rows = RowSet {
      table_id: "syn123".to_string(),
      etag: None,
      rows: vec![],
    };

    Mock::given(method("POST"))
      .and(path("/repo/v1/entity/syn123/table/deleteRows"))
      .respond_with(ResponseTemplate::new(400).set_body_json(json!({"reason": "No rows to delete"})))
      .mount(&mock_server)
      .await;

    let error = client.delete_rows(&rows).await.unwrap_err();

    assert!(error.is_client_error());
    assert!(error.to_string().contains("No rows to delete"));
    Ok(())
  }

  #[tokio::test]
  async fn test_upload_csv() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = logged_in_client(&mock_server.uri());

    let mut staged = tempfile::Builder::new().suffix(".csv").tempfile()?;
    write!(staged, "id,Title\n1,First\n")?;
    staged.flush()?;

    let table = TableEntity {
      id: "syn123".to_string(),
      name: None,
      column_ids: vec!["11".to_string(), "12".to_string()],
    };

    Mock::given(method("POST"))
      .and(path("/file/v1/file/multipart"))
      .respond_with(ResponseTemplate::new(201).set_body_json(json!({
          "uploadId": "u1",
          "state": "UPLOADING",
          "partsState": "0"
      })))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("POST"))
      .and(path("/file/v1/file/multipart/u1/presigned/url/batch"))
      .respond_with(ResponseTemplate::new(201).set_body_json(json!({
          "partPresignedUrls": [{
              "partNumber": 1,
              "uploadPresignedUrl": format!("{}/bucket/part-1", mock_server.uri())
          }]
      })))
      .mount(&mock_server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/bucket/part-1"))
      .respond_with(ResponseTemplate::new(200))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/file/v1/file/multipart/u1/add/1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({"addPartState": "ADD_SUCCESS"})))
      .mount(&mock_server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/file/v1/file/multipart/u1/complete"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
          "uploadId": "u1",
          "state": "COMPLETED",
          "partsState": "1",
          "resultFileHandleId": "900"
      })))
      .mount(&mock_server)
      .await;

    Mock::given(method("POST"))
      .and(path("/repo/v1/entity/syn123/table/upload/csv/async/start"))
      .and(body_json(json!({
          "concreteType": "org.sagebionetworks.repo.model.table.UploadToTableRequest",
          "entityId": "syn123",
          "tableId": "syn123",
          "uploadFileHandleId": "900",
          "linesToSkip": 0,
          "csvTableDescriptor": {
              "isFirstLineHeader": true,
              "separator": ",",
              "quoteCharacter": "\"",
              "escapeCharacter": "\\",
              "lineEnd": "\n"
          }
      })))
      .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token": "up1"})))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("GET"))
      .and(path("/repo/v1/entity/syn123/table/upload/csv/async/get/up1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
          "concreteType": "org.sagebionetworks.repo.model.table.UploadToTableResult",
          "rowsProcessed": 1,
          "etag": "etag-2"
      })))
      .mount(&mock_server)
      .await;

    let receipt = client.upload_csv(&table, staged.path()).await?;

    assert_eq!(receipt.table_id, "syn123");
    assert_eq!(receipt.rows_processed, 1);
    Ok(())
  }

  #[tokio::test]
  async fn test_upload_missing_file() -> anyhow::Result<()> {
    let client = logged_in_client("http://127.0.0.1:9");
    let table = TableEntity {
      id: "syn123".to_string(),
      name: None,
      column_ids: vec![],
    };

    let error = client
      .upload_csv(&table, std::path::Path::new("/nonexistent/issues.csv"))
      .await
      .unwrap_err();

    assert!(matches!(error, TableError::Io { .. }));
    Ok(())
  }
}
