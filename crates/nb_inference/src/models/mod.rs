use std::sync::Arc;
use nb_core::{Error, InferenceModel, Result};

use crate::Config;

pub mod dummy;
pub mod openai;

pub use dummy::DummyModel;
pub use openai::OpenAiModel;

/// Build the model selected on the command line.
pub fn create_model(name: &str, config: &Config) -> Result<Arc<dyn InferenceModel>> {
    match name.to_lowercase().as_str() {
        "openai" => Ok(Arc::new(OpenAiModel::new(config)?)),
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::Config(format!(
            "Unknown model '{}'. Available models: openai, dummy",
            other
        ))),
    }
}
