//! Google Drive file source boundary.
//!
//! Consumed, not owned: OAuth token acquisition lives elsewhere and a valid
//! access token is taken as given. [`DriveClient`] is the seam the ingestion
//! pipeline works against; [`google::GoogleDriveClient`] is the Drive v3
//! REST implementation.

pub mod google;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

pub use google::GoogleDriveClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
}

#[async_trait]
pub trait DriveClient: Send + Sync {
    async fn list_files(
        &self,
        page_size: usize,
        query: Option<&str>,
    ) -> Result<Vec<DriveFile>, ApiError>;

    async fn get_file_metadata(&self, file_id: &str) -> Result<DriveFile, ApiError>;

    /// Raw bytes for a file. Google Workspace documents are exported to
    /// plain text; everything else downloads as-is.
    async fn get_file_content(&self, file_id: &str, mime_type: &str)
        -> Result<Vec<u8>, ApiError>;
}
