use std::path::PathBuf;
use std::sync::Arc;
use nb_core::{ArchiveStorage, Error, Result};

use crate::session::DriveSession;

pub mod drive;
pub mod local;
pub mod memory;

pub use drive::DriveStorage;
pub use local::LocalDirStorage;
pub use memory::InMemoryStorage;

/// Where archive records end up.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    Drive { session: Arc<DriveSession> },
    Local { root: PathBuf },
    Memory,
}

pub fn create_backend(config: BackendConfig) -> Result<Arc<dyn ArchiveStorage>> {
    Ok(match config {
        BackendConfig::Drive { session } => Arc::new(DriveStorage::new(session)?),
        BackendConfig::Local { root } => Arc::new(LocalDirStorage::new(root)),
        BackendConfig::Memory => Arc::new(InMemoryStorage::new()),
    })
}

/// Storage selector as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Drive,
    Local,
    Memory,
}

impl std::str::FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "drive" => Ok(BackendKind::Drive),
            "local" => Ok(BackendKind::Local),
            "memory" => Ok(BackendKind::Memory),
            other => Err(Error::Config(format!(
                "Unknown storage '{}'. Available storages: drive, local, memory",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("drive".parse::<BackendKind>().unwrap(), BackendKind::Drive);
        assert_eq!("Local".parse::<BackendKind>().unwrap(), BackendKind::Local);
        assert_eq!("memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert!("s3".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_create_backend() {
        assert_eq!(create_backend(BackendConfig::Memory).unwrap().name(), "memory");
        let local = create_backend(BackendConfig::Local { root: PathBuf::from("/tmp/archive") }).unwrap();
        assert_eq!(local.name(), "local");
    }
}
