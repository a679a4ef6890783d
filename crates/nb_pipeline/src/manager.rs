use nb_core::logging::Logger;
use nb_core::{
    ArticleExtractor, Archiver, Condenser, Error, LinkSubmission, Outcome, RelevanceClassifier,
    Stage, SENTINEL_SUMMARY,
};
use std::str::FromStr;
use std::sync::Arc;

/// What to do when the summary could not be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CondenseFailurePolicy {
    /// Archive the sentinel text in place of the summary.
    #[default]
    ArchiveSentinel,
    /// Stop and report the failure without archiving anything.
    Abort,
}

impl FromStr for CondenseFailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "archive" | "archive-sentinel" => Ok(Self::ArchiveSentinel),
            "abort" => Ok(Self::Abort),
            other => Err(Error::Config(format!(
                "Unknown condense failure policy '{}'. Use 'archive' or 'abort'",
                other
            ))),
        }
    }
}

/// Runs one submission through fetch → classify → condense → archive.
///
/// Stages run strictly in order and none is retried. Every failure is turned
/// into an [`Outcome`]; `process` itself cannot fail.
pub struct Pipeline {
    extractor: Arc<dyn ArticleExtractor>,
    classifier: Arc<dyn RelevanceClassifier>,
    condenser: Arc<dyn Condenser>,
    archiver: Arc<dyn Archiver>,
    topic: String,
    on_condense_failure: CondenseFailurePolicy,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn ArticleExtractor>,
        classifier: Arc<dyn RelevanceClassifier>,
        condenser: Arc<dyn Condenser>,
        archiver: Arc<dyn Archiver>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            extractor,
            classifier,
            condenser,
            archiver,
            topic: topic.into(),
            on_condense_failure: CondenseFailurePolicy::default(),
        }
    }

    pub fn with_condense_failure_policy(mut self, policy: CondenseFailurePolicy) -> Self {
        self.on_condense_failure = policy;
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub async fn process(&self, submission: &LinkSubmission) -> Outcome {
        let log = Logger::new().with_prefix(format!("[chat {}]", submission.channel));
        log.info(&format!("📥 {}: {}", Stage::Received, submission.url));

        let article = match self.extractor.extract(&submission.url).await {
            Ok(article) => article,
            Err(e) => {
                log.warn(&format!("⚠️ {}: {}", Stage::ExtractFailed, e));
                return Outcome::ExtractFailed;
            }
        };
        log.info(&format!("📰 {}: {}", Stage::Extracted, article.title));

        let relevant = self.classifier.classify(&article.body, &self.topic).await;
        log.debug(&format!("{} against '{}'", Stage::Classified, self.topic));
        if !relevant {
            log.info(&format!("❌ {}: {}", Stage::NotRelevant, article.title));
            return Outcome::NotRelevant;
        }
        log.info(&format!("✅ {}: {}", Stage::Relevant, article.title));

        let summary = match self.condenser.condense(&article.body).await {
            Ok(summary) => {
                log.info(&format!("✨ {}: {} words", Stage::Condensed, summary.split_whitespace().count()));
                summary
            }
            Err(e) => match self.on_condense_failure {
                CondenseFailurePolicy::ArchiveSentinel => {
                    log.warn(&format!("{}: {}; archiving placeholder", Stage::CondenseFailed, e));
                    SENTINEL_SUMMARY.to_string()
                }
                CondenseFailurePolicy::Abort => {
                    log.warn(&format!("{}: {}", Stage::CondenseFailed, e));
                    return Outcome::CondenseFailed;
                }
            },
        };

        match self.archiver.archive(&article.title, &summary, &submission.url).await {
            Ok(receipt) => {
                log.info(&format!("🏦 {}: {} ({})", Stage::Archived, receipt.filename, receipt.remote_id));
                Outcome::Archived {
                    filename: receipt.filename,
                }
            }
            Err(e) => {
                log.error(&format!("{}: {}", Stage::ArchiveFailed, e));
                Outcome::ArchiveFailed
            }
        }
    }
}
