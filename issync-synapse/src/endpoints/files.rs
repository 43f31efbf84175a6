//! # Multipart File Upload
//!
//! Files reach Synapse through its multipart upload service: the upload is
//! registered with the file's MD5, each part is PUT to a presigned storage
//! URL and then added to the upload, and completing the upload yields a file
//! handle id that table jobs can consume.

use reqwest::Method;
use tracing::{debug, info, instrument};

use crate::client::{SynapseClient, check_status};
use crate::consts::{MAX_PARTS, MIN_PART_SIZE};
use crate::error::TableError;
use crate::models::{
  AddPartResponse, BatchPresignedUploadUrlRequest, BatchPresignedUploadUrlResponse, MultipartUploadRequest,
  MultipartUploadStatus, PartPresignedUrl,
};

/// Part size for a file of `file_size` bytes that keeps the part count
/// under the service limit.
pub(crate) fn part_size(file_size: u64) -> u64 {
  MIN_PART_SIZE.max(file_size.div_ceil(MAX_PARTS))
}

fn completed_handle(status: MultipartUploadStatus) -> Result<String, TableError> {
  status
    .result_file_handle_id
    .ok_or_else(|| TableError::Upload(format!("upload {} completed without a file handle", status.upload_id)))
}

impl SynapseClient {
  /// Upload `content` to Synapse file storage and return its file handle id.
  #[instrument(skip(self, content), fields(size = content.len()), level = "debug")]
  pub(crate) async fn upload_file(
    &self,
    file_name: &str,
    content_type: &str,
    content: &[u8],
  ) -> Result<String, TableError> {
    let file_size = content.len() as u64;
    let part_size = part_size(file_size);
    let parts: Vec<&[u8]> = if content.is_empty() {
      vec![content]
    } else {
      content.chunks(part_size as usize).collect()
    };

    let request = MultipartUploadRequest::new(
      file_name,
      content_type,
      format!("{:x}", md5::compute(content)),
      file_size,
      part_size,
    );
    let response = self
      .authenticated(Method::POST, &self.file_url("/file/multipart"))?
      .json(&request)
      .send()
      .await?;
    let status = check_status(response).await?.json::<MultipartUploadStatus>().await?;
    info!("Multipart upload {} of {} ({} parts)", status.upload_id, file_name, parts.len());

    if status.state == "COMPLETED" {
      debug!("Upload {} already complete", status.upload_id);
      return completed_handle(status);
    }

    let pending: Vec<u64> = (1..=parts.len() as u64)
      .filter(|part| status.parts_state.as_bytes().get((part - 1) as usize) != Some(&b'1'))
      .collect();

    if !pending.is_empty() {
      let presigned = self.presigned_urls(&status.upload_id, pending).await?;
      for url in presigned {
        let chunk = url
          .part_number
          .checked_sub(1)
          .and_then(|index| parts.get(index as usize))
          .ok_or_else(|| TableError::Upload(format!("presigned url for unknown part {}", url.part_number)))?;
        self.put_part(&status.upload_id, &url, chunk).await?;
      }
    }

    let url = self.file_url(&format!("/file/multipart/{}/complete", status.upload_id));
    let response = self.authenticated(Method::PUT, &url)?.send().await?;
    let status = check_status(response).await?.json::<MultipartUploadStatus>().await?;

    if status.state != "COMPLETED" {
      return Err(TableError::Upload(format!(
        "upload {} ended in state {}",
        status.upload_id, status.state
      )));
    }
    completed_handle(status)
  }

  async fn presigned_urls(&self, upload_id: &str, part_numbers: Vec<u64>) -> Result<Vec<PartPresignedUrl>, TableError> {
    let url = self.file_url(&format!("/file/multipart/{upload_id}/presigned/url/batch"));
    let request = BatchPresignedUploadUrlRequest { upload_id, part_numbers };

    let response = self.authenticated(Method::POST, &url)?.json(&request).send().await?;
    let batch = check_status(response)
      .await?
      .json::<BatchPresignedUploadUrlResponse>()
      .await?;

    Ok(batch.part_presigned_urls)
  }

  async fn put_part(&self, upload_id: &str, presigned: &PartPresignedUrl, chunk: &[u8]) -> Result<(), TableError> {
    debug!("Uploading part {} ({} bytes)", presigned.part_number, chunk.len());

    // Storage URLs are already signed; the API key headers must not go there.
    let mut request = self.client.put(&presigned.upload_presigned_url);
    for (name, value) in &presigned.signed_headers {
      request = request.header(name, value);
    }
    let response = request.body(chunk.to_vec()).send().await?;
    if !response.status().is_success() {
      return Err(TableError::Upload(format!(
        "storage rejected part {}: HTTP {}",
        presigned.part_number,
        response.status()
      )));
    }

    let url = self.file_url(&format!("/file/multipart/{upload_id}/add/{}", presigned.part_number));
    let response = self
      .authenticated(Method::PUT, &url)?
      .query(&[("partMD5Hex", format!("{:x}", md5::compute(chunk)))])
      .send()
      .await?;
    let added = check_status(response).await?.json::<AddPartResponse>().await?;

    if added.add_part_state != "ADD_SUCCESS" {
      return Err(TableError::Upload(format!(
        "part {} not added: {}",
        presigned.part_number,
        added.error_message.unwrap_or(added.add_part_state)
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use serde_json::json;
  use wiremock::matchers::{body_json, body_string, header, header_exists, method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use super::part_size;
  use crate::client::SynapseClient;
  use crate::consts::MIN_PART_SIZE;
  use crate::error::TableError;
  use crate::models::{SynapseAuth, UserProfile};

  const CONTENT: &str = "id,Title\n1,First\n";
  const CONTENT_MD5: &str = "ce25a5d13028a7edeb3c52b67964305b";

  fn logged_in_client(base_url: &str) -> SynapseClient {
    let auth = SynapseAuth {
      username: "test_user".to_string(),
      api_key: "aXNzeW5jLXRlc3Qtc2VjcmV0".to_string(),
    };
    let mut client =
      SynapseClient::new(base_url, auth).with_job_polling(Duration::from_millis(5), Duration::from_secs(5));
    client.profile = Some(UserProfile {
      owner_id: "1".to_string(),
      user_name: None,
    });
    client
  }

  async fn mount_start(server: &MockServer, state: &str) {
    let file_handle = if state == "COMPLETED" { json!("901") } else { json!(null) };
    Mock::given(method("POST"))
      .and(path("/file/v1/file/multipart"))
      .and(header("userId", "test_user"))
      .and(body_json(json!({
          "concreteType": "org.sagebionetworks.repo.model.file.MultipartUploadRequest",
          "contentMD5Hex": CONTENT_MD5,
          "fileName": "issues.csv",
          "contentType": "text/csv",
          "partSizeBytes": MIN_PART_SIZE,
          "fileSizeBytes": CONTENT.len(),
          "generatePreview": false
      })))
      .respond_with(ResponseTemplate::new(201).set_body_json(json!({
          "uploadId": "u1",
          "state": state,
          "partsState": "0",
          "resultFileHandleId": file_handle
      })))
      .expect(1)
      .mount(server)
      .await;
  }

  #[test]
  fn test_part_size() {
    assert_eq!(part_size(0), MIN_PART_SIZE);
    assert_eq!(part_size(17), MIN_PART_SIZE);
    // 100 GiB needs larger parts to stay within 10,000 of them.
    let large = 100 * 1024 * 1024 * 1024;
    assert_eq!(part_size(large), large.div_ceil(10_000));
  }

  #[tokio::test]
  async fn test_upload_single_part() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = logged_in_client(&mock_server.uri());
    mount_start(&mock_server, "UPLOADING").await;

    Mock::given(method("POST"))
      .and(path("/file/v1/file/multipart/u1/presigned/url/batch"))
      .and(body_json(json!({"uploadId": "u1", "partNumbers": [1]})))
      .respond_with(ResponseTemplate::new(201).set_body_json(json!({
          "partPresignedUrls": [{
              "partNumber": 1,
              "uploadPresignedUrl": format!("{}/bucket/part-1?X-Amz-Signature=abc", mock_server.uri()),
              "signedHeaders": {"Content-Type": "text/csv"}
          }]
      })))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/bucket/part-1"))
      .and(query_param("X-Amz-Signature", "abc"))
      .and(header("Content-Type", "text/csv"))
      .and(body_string(CONTENT))
      .respond_with(ResponseTemplate::new(200))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/file/v1/file/multipart/u1/add/1"))
      .and(query_param("partMD5Hex", CONTENT_MD5))
      .and(header_exists("signature"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({"addPartState": "ADD_SUCCESS"})))
      .expect(1)
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
      .expect(1)
      .mount(&mock_server)
      .await;

    let handle = client.upload_file("issues.csv", "text/csv", CONTENT.as_bytes()).await?;

    assert_eq!(handle, "900");
    Ok(())
  }

  #[tokio::test]
  async fn test_upload_already_completed() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = logged_in_client(&mock_server.uri());
    mount_start(&mock_server, "COMPLETED").await;

    Mock::given(method("POST"))
      .and(path("/file/v1/file/multipart/u1/presigned/url/batch"))
      .respond_with(ResponseTemplate::new(201))
      .expect(0)
      .mount(&mock_server)
      .await;

    let handle = client.upload_file("issues.csv", "text/csv", CONTENT.as_bytes()).await?;

    assert_eq!(handle, "901");
    Ok(())
  }

  #[tokio::test]
  async fn test_upload_part_rejected() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = logged_in_client(&mock_server.uri());
    mount_start(&mock_server, "UPLOADING").await;

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
      .mount(&mock_server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/file/v1/file/multipart/u1/add/1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
          "addPartState": "ADD_FAILED",
          "errorMessage": "MD5 mismatch"
      })))
      .mount(&mock_server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/file/v1/file/multipart/u1/complete"))
      .respond_with(ResponseTemplate::new(200))
      .expect(0)
      .mount(&mock_server)
      .await;

    let error = client
      .upload_file("issues.csv", "text/csv", CONTENT.as_bytes())
      .await
      .unwrap_err();

    match error {
      TableError::Upload(message) => assert!(message.contains("MD5 mismatch")),
      other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
  }
}
