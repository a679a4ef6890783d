pub mod error;
pub mod extract;
pub mod logging;
pub mod models;
pub mod notify;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use extract::ArticleExtractor;
pub use models::{CompletionRequest, Condenser, InferenceModel, RelevanceClassifier};
pub use notify::Notifier;
pub use storage::{ArchiveReceipt, ArchiveStorage, Archiver, StagedFile};
pub use types::{
    ChannelId, ExtractedArticle, LinkSubmission, Outcome, Stage, SENTINEL_SUMMARY,
    UNSUPPORTED_INPUT_MESSAGE,
};

pub mod prelude {
    pub use super::{ArticleExtractor, Error, ExtractedArticle, LinkSubmission, Outcome, Result};
}
