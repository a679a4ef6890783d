use async_trait::async_trait;
use chrono::Local;
use nb_core::{ArchiveReceipt, ArchiveStorage, Archiver, Error, Result, StagedFile};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::archive::{ArchiveContent, ArchiveRecord};

/// Stages records on local disk and uploads them to the configured store.
///
/// The staged copy is removed only once the upload is confirmed. A failed
/// upload leaves it in the staging directory under the record's filename.
pub struct ArchiveWriter {
    storage: Arc<dyn ArchiveStorage>,
    folder_id: String,
    staging_dir: PathBuf,
}

impl ArchiveWriter {
    pub fn new(
        storage: Arc<dyn ArchiveStorage>,
        folder_id: impl Into<String>,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            storage,
            folder_id: folder_id.into(),
            staging_dir: staging_dir.into(),
        }
    }

    pub fn folder_id(&self) -> &str {
        &self.folder_id
    }

    pub async fn write(&self, record: &ArchiveRecord) -> Result<ArchiveReceipt> {
        let dir = self.staging_dir.clone();
        let content = record.content.render();
        let staged = blocking(move || stage(&dir, &content))
            .await
            .map_err(|e| Error::Archive {
                message: format!("could not stage {}: {}", record.filename, e),
                kept: None,
            })?;
        info!("📝 Summary staged for {}", record.filename);

        let file = StagedFile {
            filename: record.filename.clone(),
            folder_id: record.folder_id.clone(),
            path: staged.path().to_path_buf(),
        };

        match self.storage.upload(&file).await {
            Ok(remote_id) => {
                if let Err(e) = blocking(move || staged.close()).await {
                    warn!("Could not remove staged copy of {}: {}", record.filename, e);
                }
                Ok(ArchiveReceipt {
                    filename: record.filename.clone(),
                    remote_id,
                })
            }
            Err(e) => {
                let target = self.staging_dir.join(&record.filename);
                let kept = blocking(move || Ok(keep(staged, &target))).await.ok().flatten();
                match &kept {
                    Some(path) => warn!("Upload to {} failed, local copy kept at {}", self.storage.name(), path.display()),
                    None => warn!("Upload to {} failed and the local copy was lost", self.storage.name()),
                }
                Err(Error::Archive {
                    message: format!("upload of {} failed: {}", record.filename, e),
                    kept,
                })
            }
        }
    }
}

/// Run file system work on the blocking pool.
async fn blocking<T, F>(f: F) -> std::io::Result<T>
where
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
}

fn stage(dir: &Path, content: &str) -> std::io::Result<NamedTempFile> {
    std::fs::create_dir_all(dir)?;
    let mut file = tempfile::Builder::new()
        .prefix("Resumen_")
        .suffix(".txt")
        .tempfile_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Turn the temporary file into a permanent one, preferably named `target`.
fn keep(staged: NamedTempFile, target: &Path) -> Option<PathBuf> {
    match staged.persist_noclobber(target) {
        Ok(_) => Some(target.to_path_buf()),
        Err(e) => e.file.keep().ok().map(|(_, path)| path),
    }
}

#[async_trait]
impl Archiver for ArchiveWriter {
    async fn archive(&self, title: &str, summary: &str, link: &str) -> Result<ArchiveReceipt> {
        let content = ArchiveContent::new(title, summary, link, Local::now());
        let record = ArchiveRecord::new(content, &self.folder_id);
        self.write(&record).await
    }
}
