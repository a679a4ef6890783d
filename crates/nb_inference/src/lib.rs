use nb_core::{Error, Result};

pub mod condenser;
pub mod models;
pub mod relevance;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TOPIC: &str = "educación";
pub const AFFIRMATIVE_TOKEN: &str = "Sí";

#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_name: String,
    pub base_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is required for the openai model".to_string()))
    }
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

pub mod prelude {
    pub use super::condenser::LlmCondenser;
    pub use super::models::create_model;
    pub use super::relevance::LlmRelevanceClassifier;
    pub use super::Config;
    pub use nb_core::{Condenser, Error, InferenceModel, RelevanceClassifier, Result};
}

pub use models::create_model;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate_chars("educación", 8), "educació");
        assert_eq!(truncate_chars("ñandú", 10), "ñandú");
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_api_key_required() {
        assert!(Config::default().require_api_key().is_err());
        let config = Config {
            api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
        assert!(!format!("{:?}", config).contains("sk-test"));
    }
}
