//! Google Drive Client
//!
//! `BlobStore` implementation over the Drive v3 app-data folder. The
//! bearer credential comes from an external consent flow; a 401 from
//! any call is surfaced as `SyncError::Unauthorized` and nothing is
//! retried here.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use super::blob::{BlobStore, RemoteFile, SyncError};

const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3/files";
const MULTIPART_BOUNDARY: &str = "-------habitsyncboundary";

pub struct DriveClient {
    http: reqwest::Client,
    access_token: String,
}

impl DriveClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        DriveClient {
            http: reqwest::Client::new(),
            access_token: access_token.into(),
        }
    }
}

fn network_error(error: reqwest::Error) -> SyncError {
    SyncError::Network(error.to_string())
}

fn decode_error(error: reqwest::Error) -> SyncError {
    SyncError::Decode(error.to_string())
}

fn status_error(status: StatusCode, message: &str) -> SyncError {
    if status == StatusCode::UNAUTHORIZED {
        SyncError::Unauthorized
    } else {
        SyncError::Http {
            status: status.as_u16(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for DriveClient {
    async fn find_file(&self, name: &str) -> Result<Option<RemoteFile>, SyncError> {
        #[derive(Deserialize)]
        struct FileList {
            #[serde(default)]
            files: Vec<RemoteFile>,
        }

        let query = format!("name='{}' and trashed=false", name);
        let response = self
            .http
            .get(format!("{}/files", DRIVE_API_BASE))
            .query(&[
                ("spaces", "appDataFolder"),
                ("q", query.as_str()),
                ("fields", "files(id,name,modifiedTime)"),
            ])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(network_error)?;
        if !response.status().is_success() {
            return Err(status_error(response.status(), "Failed to list files"));
        }
        let list: FileList = response.json().await.map_err(decode_error)?;
        Ok(list.files.into_iter().next())
    }

    async fn create_file(&self, name: &str, body: &Value) -> Result<RemoteFile, SyncError> {
        let metadata = serde_json::json!({
            "name": name,
            "parents": ["appDataFolder"],
            "mimeType": "application/json",
        });
        let payload = format!(
            "--{boundary}\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\r\n\
             {metadata}\r\n\
             --{boundary}\r\n\
             Content-Type: application/json\r\n\r\n\
             {body}\r\n\
             --{boundary}--",
            boundary = MULTIPART_BOUNDARY,
            metadata = metadata,
            body = body,
        );

        let response = self
            .http
            .post(format!(
                "{}?uploadType=multipart&fields=id,name,modifiedTime",
                DRIVE_UPLOAD_BASE
            ))
            .bearer_auth(&self.access_token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(payload)
            .send()
            .await
            .map_err(network_error)?;
        if !response.status().is_success() {
            return Err(status_error(response.status(), "Failed to create file"));
        }
        response.json().await.map_err(decode_error)
    }

    async fn download(&self, file_id: &str) -> Result<Value, SyncError> {
        let response = self
            .http
            .get(format!("{}/files/{}", DRIVE_API_BASE, file_id))
            .query(&[("alt", "media")])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(network_error)?;
        if !response.status().is_success() {
            return Err(status_error(response.status(), "Failed to download file"));
        }
        response.json().await.map_err(decode_error)
    }

    async fn upload(&self, file_id: &str, body: &Value) -> Result<(), SyncError> {
        let response = self
            .http
            .patch(format!("{}/{}?uploadType=media", DRIVE_UPLOAD_BASE, file_id))
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(network_error)?;
        if !response.status().is_success() {
            return Err(status_error(response.status(), "Failed to upload file"));
        }
        Ok(())
    }
}
