use async_trait::async_trait;
use nb_core::{ArchiveStorage, Result, StagedFile};
use std::path::PathBuf;
use tracing::debug;

/// Copies records into `<root>/<folder_id>/`, for running without Drive.
#[derive(Debug, Clone)]
pub struct LocalDirStorage {
    root: PathBuf,
}

impl LocalDirStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArchiveStorage for LocalDirStorage {
    fn name(&self) -> &str {
        "local"
    }

    async fn upload(&self, file: &StagedFile) -> Result<String> {
        let folder = self.root.join(&file.folder_id);
        tokio::fs::create_dir_all(&folder).await?;

        let destination = folder.join(&file.filename);
        tokio::fs::copy(&file.path, &destination).await?;
        debug!("Copied {} to {}", file.path.display(), destination.display());

        Ok(destination.display().to_string())
    }
}
