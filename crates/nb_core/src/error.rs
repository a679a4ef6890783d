use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Condensation error: {0}")]
    Condensation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Archive error: {message}")]
    Archive {
        message: String,
        /// Local copy left behind when the upload did not go through.
        kept: Option<PathBuf>,
    },

    #[error("Invalid archive record: {0}")]
    RecordFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
