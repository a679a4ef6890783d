use async_trait::async_trait;
use nb_core::{ArchiveStorage, Error, Result, StagedFile};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::session::DriveSession;

pub const DRIVE_API_URL: &str = "https://www.googleapis.com";

#[derive(Deserialize)]
struct UploadResponse {
    id: String,
}

/// Uploads records as plain-text files into a Google Drive folder.
#[derive(Debug, Clone)]
pub struct DriveStorage {
    client: Client,
    session: Arc<DriveSession>,
    base_url: String,
}

impl DriveStorage {
    pub fn new(session: Arc<DriveSession>) -> Result<Self> {
        Self::with_base_url(session, DRIVE_API_URL)
    }

    pub fn with_base_url(session: Arc<DriveSession>, base_url: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// `multipart/related` body: JSON metadata part, then the file content.
fn multipart_body(boundary: &str, metadata: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + content.len() + 256);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{m}\r\n\
             --{b}\r\nContent-Type: text/plain; charset=UTF-8\r\n\r\n",
            b = boundary,
            m = metadata
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

#[async_trait]
impl ArchiveStorage for DriveStorage {
    fn name(&self) -> &str {
        "drive"
    }

    async fn upload(&self, file: &StagedFile) -> Result<String> {
        let token = self.session.access_token().await?;
        let content = tokio::fs::read(&file.path).await?;

        let metadata = json!({
            "name": file.filename,
            "parents": [file.folder_id],
            "mimeType": "text/plain",
        })
        .to_string();
        let boundary = format!("notucias-{}", Uuid::new_v4().simple());

        let response = self
            .client
            .post(format!("{}/upload/drive/v3/files", self.base_url))
            .query(&[("uploadType", "multipart")])
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(multipart_body(&boundary, &metadata, &content))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(Error::Storage(format!(
                "Drive upload of {} failed with {}: {}",
                file.filename, status, error_text
            )));
        }

        let uploaded = response.json::<UploadResponse>().await?;
        info!("☁️ Uploaded {} to Drive as {}", file.filename, uploaded.id);
        Ok(uploaded.id)
    }
}
