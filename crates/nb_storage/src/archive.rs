use chrono::{DateTime, Local};
use nb_core::{Error, Result};
use uuid::Uuid;

/// Minute resolution, as shown in the record header and the filename.
pub const STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";
const FILENAME_PREFIX: &str = "Resumen_";
const LINK_PREFIX: &str = "Link original: ";

/// Text of an archived summary.
///
/// ```text
/// --- {title} --- ({stamp})
/// Link original: {link}
///
/// {summary}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveContent {
    pub title: String,
    pub stamp: String,
    pub link: String,
    pub summary: String,
}

impl ArchiveContent {
    pub fn new(title: &str, summary: &str, link: &str, at: DateTime<Local>) -> Self {
        Self {
            title: single_line(title),
            stamp: at.format(STAMP_FORMAT).to_string(),
            link: single_line(link),
            summary: summary.to_string(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "--- {} --- ({})\n{}{}\n\n{}\n",
            self.title, self.stamp, LINK_PREFIX, self.link, self.summary
        )
    }

    pub fn parse(text: &str) -> Result<Self> {
        let (header, rest) = text
            .split_once('\n')
            .ok_or_else(|| Error::RecordFormat("missing header line".to_string()))?;

        let (title, stamp) = header
            .strip_prefix("--- ")
            .and_then(|h| h.strip_suffix(')'))
            .and_then(|h| h.rsplit_once(" --- ("))
            .ok_or_else(|| Error::RecordFormat(format!("malformed header: {}", header)))?;

        let (link_line, rest) = rest
            .split_once('\n')
            .ok_or_else(|| Error::RecordFormat("missing link line".to_string()))?;
        let link = link_line
            .strip_prefix(LINK_PREFIX)
            .ok_or_else(|| Error::RecordFormat(format!("malformed link line: {}", link_line)))?;

        let summary = rest
            .strip_prefix('\n')
            .ok_or_else(|| Error::RecordFormat("missing blank line before summary".to_string()))?;
        let summary = summary.strip_suffix('\n').unwrap_or(summary);

        Ok(Self {
            title: title.to_string(),
            stamp: stamp.to_string(),
            link: link.to_string(),
            summary: summary.to_string(),
        })
    }
}

// Title and link live on fixed lines of the layout. Only line breaks are
// replaced, so surrounding whitespace survives a parse.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// An archive entry bound for a folder of the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    pub filename: String,
    pub folder_id: String,
    pub content: ArchiveContent,
}

impl ArchiveRecord {
    pub fn new(content: ArchiveContent, folder_id: impl Into<String>) -> Self {
        Self {
            filename: unique_filename(&content.stamp),
            folder_id: folder_id.into(),
            content,
        }
    }
}

/// `Resumen_{stamp}_{token}.txt`; the random token keeps two records from the
/// same minute apart.
pub fn unique_filename(stamp: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("{}{}_{}.txt", FILENAME_PREFIX, stamp, &token[..8])
}
