use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::Result;

/// A single-turn request to a text-generation service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
}

#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Send one user message and return the text of the first completion.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[async_trait]
pub trait RelevanceClassifier: Send + Sync {
    /// Decide whether `body` is about `topic`. Fails closed: any error is `false`.
    async fn classify(&self, body: &str, topic: &str) -> bool;
}

#[async_trait]
pub trait Condenser: Send + Sync {
    /// Produce the narrative summary of `body`.
    async fn condense(&self, body: &str) -> Result<String>;
}
