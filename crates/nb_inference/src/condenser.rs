use async_trait::async_trait;
use nb_core::{CompletionRequest, Condenser, Error, InferenceModel, Result};
use std::sync::Arc;
use tracing::{debug, error};

use crate::truncate_chars;

pub const MAX_BODY_CHARS: usize = 3000;
pub const TEMPERATURE: f32 = 0.7;

/// Writes the narrative summary. Length and tone are requested in the prompt,
/// not checked on the reply.
#[derive(Debug, Clone)]
pub struct LlmCondenser {
    model: Arc<dyn InferenceModel>,
    model_name: String,
}

impl LlmCondenser {
    pub fn new(model: Arc<dyn InferenceModel>, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }

    pub fn prompt(body: &str) -> String {
        format!(
            "Resume el siguiente artículo usando solo información del texto. \
             No agregues datos externos. \
             Estilo: íntimo, reflexivo, sensible, frases breves, sin tecnicismos, \
             con tono humano y melancólico. \
             Tamaño: 300-400 palabras.\n\
             {}",
            truncate_chars(body, MAX_BODY_CHARS)
        )
    }
}

#[async_trait]
impl Condenser for LlmCondenser {
    async fn condense(&self, body: &str) -> Result<String> {
        let request = CompletionRequest {
            model: self.model_name.clone(),
            prompt: Self::prompt(body),
            temperature: TEMPERATURE,
        };

        let summary = self.model.complete(&request).await.map_err(|e| {
            error!("Summary generation failed: {}", e);
            Error::Condensation(e.to_string())
        })?;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(Error::Condensation("model returned an empty summary".to_string()));
        }

        debug!("Summary has {} words", summary.split_whitespace().count());
        Ok(summary.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingModel {
        reply: Option<String>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl InferenceModel for RecordingModel {
        fn name(&self) -> &str {
            "Recording"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply
                .clone()
                .ok_or_else(|| Error::Inference("service unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_condense_request_shape() {
        let model = Arc::new(RecordingModel {
            reply: Some("  Una tarde cualquiera, la escuela volvió a abrir.  ".to_string()),
            ..Default::default()
        });
        let condenser = LlmCondenser::new(model.clone(), "gpt-3.5-turbo");
        let body = "palabra ".repeat(1000);

        let summary = condenser.condense(&body).await.unwrap();
        assert_eq!(summary, "Una tarde cualquiera, la escuela volvió a abrir.");

        let requests = model.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, TEMPERATURE);
        assert!(requests[0].prompt.contains("300-400 palabras"));
        assert!(requests[0].prompt.contains("melancólico"));
        let sent = requests[0].prompt.split_once('\n').unwrap().1;
        assert_eq!(sent.chars().count(), MAX_BODY_CHARS);
    }

    #[tokio::test]
    async fn test_provider_error_is_typed() {
        let model = Arc::new(RecordingModel::default());
        let condenser = LlmCondenser::new(model.clone(), "gpt-3.5-turbo");
        let result = condenser.condense("Texto").await;
        assert!(matches!(result, Err(Error::Condensation(_))));
        assert_eq!(model.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_reply_is_an_error() {
        let model = Arc::new(RecordingModel {
            reply: Some(" \n ".to_string()),
            ..Default::default()
        });
        let condenser = LlmCondenser::new(model, "gpt-3.5-turbo");
        assert!(condenser.condense("Texto").await.is_err());
    }
}
