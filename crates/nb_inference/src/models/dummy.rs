use std::fmt;
use nb_core::{CompletionRequest, InferenceModel, Result};

use crate::AFFIRMATIVE_TOKEN;

/// Offline stand-in for a real model, for dry runs.
///
/// Deterministic requests (temperature 0) are treated as yes/no questions and
/// answered affirmatively; anything else gets the first words of the prompt's
/// last line back.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    const SUMMARY_WORDS: usize = 60;

    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if request.temperature == 0.0 {
            return Ok(AFFIRMATIVE_TOKEN.to_string());
        }

        let last_line = request.prompt.lines().last().unwrap_or_default();
        let words: Vec<&str> = last_line.split_whitespace().take(Self::SUMMARY_WORDS).collect();
        Ok(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_model() {
        let model = DummyModel::new();

        let question = CompletionRequest {
            model: "dummy".to_string(),
            prompt: "¿Es relevante?".to_string(),
            temperature: 0.0,
        };
        assert_eq!(model.complete(&question).await.unwrap(), "Sí");

        let summary = CompletionRequest {
            model: "dummy".to_string(),
            prompt: "Resume esto.\nEste es   el texto del artículo.".to_string(),
            temperature: 0.7,
        };
        assert_eq!(model.complete(&summary).await.unwrap(), "Este es el texto del artículo.");
    }
}
