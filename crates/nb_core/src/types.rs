use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Placeholder archived in place of a summary the model failed to produce.
pub const SENTINEL_SUMMARY: &str = "⚠️ Error al generar el resumen.";

/// Reply for any message that is neither a link nor a command.
pub const UNSUPPORTED_INPUT_MESSAGE: &str = "🚫 Solo acepto links.";

/// Opaque identifier of the chat a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub i64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One link received from a requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSubmission {
    pub url: String,
    pub channel: ChannelId,
}

impl LinkSubmission {
    pub fn new(url: impl Into<String>, channel: ChannelId) -> Self {
        Self {
            url: url.into(),
            channel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedArticle {
    pub url: String,
    pub title: String,
    pub body: String,
}

impl ExtractedArticle {
    /// Both title and body must carry text, otherwise the extraction counts as failed.
    pub fn new(url: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let title = title.into().trim().to_string();
        let body = body.into().trim().to_string();

        if title.is_empty() {
            return Err(Error::Scraping(format!("No title found in {}", url)));
        }
        if body.is_empty() {
            return Err(Error::Scraping(format!("No article text found in {}", url)));
        }

        Ok(Self { url, title, body })
    }
}

/// Steps a submission goes through, used for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Extracted,
    ExtractFailed,
    Classified,
    Relevant,
    NotRelevant,
    Condensed,
    CondenseFailed,
    Archived,
    ArchiveFailed,
    Notified,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Extracted => "extracted",
            Stage::ExtractFailed => "extract-failed",
            Stage::Classified => "classified",
            Stage::Relevant => "relevant",
            Stage::NotRelevant => "not-relevant",
            Stage::Condensed => "condensed",
            Stage::CondenseFailed => "condense-failed",
            Stage::Archived => "archived",
            Stage::ArchiveFailed => "archive-failed",
            Stage::Notified => "notified",
        };
        f.write_str(name)
    }
}

/// Terminal state of a submission. Each one maps to exactly one reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    ExtractFailed,
    NotRelevant,
    CondenseFailed,
    Archived { filename: String },
    ArchiveFailed,
}

impl Outcome {
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::ExtractFailed => "⚠️ No se pudo procesar el artículo.",
            Outcome::NotRelevant => "❌ Noticia no relevante; descartada.",
            Outcome::CondenseFailed => "⚠️ No se pudo generar el resumen.",
            Outcome::Archived { .. } => "✅ Resumen creado y subido a Drive.",
            Outcome::ArchiveFailed => "⚠️ Resumen creado, pero no se pudo subir a Drive.",
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Outcome::ExtractFailed => Stage::ExtractFailed,
            Outcome::NotRelevant => Stage::NotRelevant,
            Outcome::CondenseFailed => Stage::CondenseFailed,
            Outcome::Archived { .. } => Stage::Archived,
            Outcome::ArchiveFailed => Stage::ArchiveFailed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Archived { .. })
    }
}
