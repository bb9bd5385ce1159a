use std::sync::Arc;
use tracing::info;
use nc_core::{Error, InferenceModel, Result};
use crate::Config;

pub mod dummy;
pub mod gemini;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;

/// Builds the model selected by `config.model_name` (`gemini` by default, or `dummy`).
pub async fn create_model(config: Option<Config>) -> Result<Arc<dyn InferenceModel>> {
    let config = config.unwrap_or_default();
    let model_name = config.model_name.as_deref().unwrap_or("gemini").to_lowercase();

    let model: Arc<dyn InferenceModel> = match model_name.as_str() {
        "gemini" => {
            let api_key = config
                .api_key
                .filter(|k| !k.is_empty())
                .ok_or_else(|| Error::MissingConfig("GEMINI_API_KEY".to_string()))?;
            Arc::new(GeminiModel::new(api_key, &config.inference_config)?)
        }
        "dummy" => Arc::new(DummyModel::new()),
        other => {
            return Err(Error::Inference(format!(
                "Unknown model: {}. Available models: gemini (default), dummy",
                other
            )))
        }
    };

    info!("🧠 Inference model ready (using {})", model.name());
    Ok(model)
}
