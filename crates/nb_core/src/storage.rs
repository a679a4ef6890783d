use async_trait::async_trait;
use std::path::PathBuf;

use crate::Result;

/// A rendered archive record sitting in local staging, ready to upload.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub filename: String,
    pub folder_id: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReceipt {
    pub filename: String,
    pub remote_id: String,
}

/// Remote file store that archive records are uploaded to.
#[async_trait]
pub trait ArchiveStorage: Send + Sync {
    fn name(&self) -> &str;

    /// Upload the staged file and return the identifier the store assigned to it.
    async fn upload(&self, file: &StagedFile) -> Result<String>;
}

#[async_trait]
pub trait Archiver: Send + Sync {
    async fn archive(&self, title: &str, summary: &str, link: &str) -> Result<ArchiveReceipt>;
}
