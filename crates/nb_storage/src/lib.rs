pub mod archive;
pub mod backends;
pub mod session;
pub mod writer;

pub use archive::{ArchiveContent, ArchiveRecord};
pub use backends::*;
pub use session::{DriveSession, OAuthCredentials};
pub use writer::ArchiveWriter;

pub mod prelude {
    pub use super::backends::*;
    pub use super::{ArchiveContent, ArchiveRecord, ArchiveWriter, DriveSession};
    pub use nb_core::{ArchiveReceipt, ArchiveStorage, Archiver, StagedFile};
}
