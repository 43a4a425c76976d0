use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::core::errors::ApiError;

use super::{DriveClient, DriveFile};

const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
const FILE_FIELDS: &str = "id,name,mimeType,size,modifiedTime,webViewLink";

pub struct GoogleDriveClient {
    client: Client,
    access_token: String,
}

#[derive(Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
}

impl GoogleDriveClient {
    pub fn new(access_token: String) -> Self {
        Self {
            client: Client::new(),
            access_token,
        }
    }

    async fn check_status(
        res: reqwest::Response,
        what: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let detail = res.text().await.unwrap_or_default();
        tracing::error!("Google Drive {} error ({}): {}", what, status, detail);
        match status.as_u16() {
            401 | 403 => Err(ApiError::Unauthorized),
            404 => Err(ApiError::NotFound(format!("Drive {what}"))),
            _ => Err(ApiError::Internal(format!(
                "Google Drive {what} failed with status {status}"
            ))),
        }
    }
}

#[async_trait]
impl DriveClient for GoogleDriveClient {
    async fn list_files(
        &self,
        page_size: usize,
        query: Option<&str>,
    ) -> Result<Vec<DriveFile>, ApiError> {
        let mut url = format!(
            "{DRIVE_API_BASE}/files?pageSize={page_size}&fields=files({FILE_FIELDS})"
        );
        if let Some(q) = query {
            url.push_str(&format!("&q={}", urlencoding::encode(q)));
        }

        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ApiError::unavailable("google-drive", e))?;
        let res = Self::check_status(res, "file listing").await?;

        let payload: FileListResponse = res.json().await.map_err(ApiError::internal)?;
        Ok(payload.files)
    }

    async fn get_file_metadata(&self, file_id: &str) -> Result<DriveFile, ApiError> {
        let url = format!("{DRIVE_API_BASE}/files/{file_id}?fields={FILE_FIELDS}");

        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ApiError::unavailable("google-drive", e))?;
        let res = Self::check_status(res, "file metadata").await?;

        res.json().await.map_err(ApiError::internal)
    }

    async fn get_file_content(
        &self,
        file_id: &str,
        mime_type: &str,
    ) -> Result<Vec<u8>, ApiError> {
        let url = if mime_type.starts_with("application/vnd.google-apps") {
            format!("{DRIVE_API_BASE}/files/{file_id}/export?mimeType=text/plain")
        } else {
            format!("{DRIVE_API_BASE}/files/{file_id}?alt=media")
        };

        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ApiError::unavailable("google-drive", e))?;
        let res = Self::check_status(res, "file download").await?;

        let bytes = res.bytes().await.map_err(ApiError::internal)?;
        Ok(bytes.to_vec())
    }
}
