use async_trait::async_trait;
use nb_core::{CompletionRequest, InferenceModel, RelevanceClassifier};
use std::sync::Arc;
use tracing::{debug, error};

use crate::{truncate_chars, AFFIRMATIVE_TOKEN};

/// Only the head of the article is sent, to bound prompt size and latency.
pub const MAX_BODY_CHARS: usize = 2000;

/// Asks the model a yes/no question at temperature 0.
#[derive(Debug, Clone)]
pub struct LlmRelevanceClassifier {
    model: Arc<dyn InferenceModel>,
    model_name: String,
    affirmative: String,
}

impl LlmRelevanceClassifier {
    pub fn new(model: Arc<dyn InferenceModel>, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
            affirmative: AFFIRMATIVE_TOKEN.to_string(),
        }
    }

    pub fn with_affirmative(mut self, token: impl Into<String>) -> Self {
        self.affirmative = token.into();
        self
    }

    pub fn prompt(body: &str, topic: &str) -> String {
        format!(
            "Determina si esta noticia es relevante para el tema '{}'. \
             Responde solo 'Sí' o 'No'.\n\
             Texto: {}",
            topic,
            truncate_chars(body, MAX_BODY_CHARS)
        )
    }

    pub fn is_affirmative(&self, reply: &str) -> bool {
        reply
            .trim()
            .to_lowercase()
            .starts_with(&self.affirmative.to_lowercase())
    }
}

#[async_trait]
impl RelevanceClassifier for LlmRelevanceClassifier {
    async fn classify(&self, body: &str, topic: &str) -> bool {
        if body.trim().is_empty() {
            return false;
        }

        let request = CompletionRequest {
            model: self.model_name.clone(),
            prompt: Self::prompt(body, topic),
            temperature: 0.0,
        };

        match self.model.complete(&request).await {
            Ok(reply) => {
                let verdict = self.is_affirmative(&reply);
                debug!("Relevance for '{}': {:?} -> {}", topic, reply, verdict);
                verdict
            }
            Err(e) => {
                error!("Relevance check failed, discarding: {}", e);
                false
            }
        }
    }
}
