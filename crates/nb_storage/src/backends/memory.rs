use async_trait::async_trait;
use nb_core::{ArchiveStorage, Result, StagedFile};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub folder_id: String,
    pub content: String,
}

/// Keeps uploads in memory. Used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    files: Arc<RwLock<Vec<StoredFile>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn files(&self) -> Vec<StoredFile> {
        self.files.read().await.clone()
    }
}

#[async_trait]
impl ArchiveStorage for InMemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn upload(&self, file: &StagedFile) -> Result<String> {
        let content = tokio::fs::read_to_string(&file.path).await?;
        let mut files = self.files.write().await;
        files.push(StoredFile {
            filename: file.filename.clone(),
            folder_id: file.folder_id.clone(),
            content,
        });
        Ok(format!("memory://{}/{}", file.folder_id, file.filename))
    }
}
