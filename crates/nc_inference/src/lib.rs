use std::time::Duration;

pub mod models;
pub mod prompt;
pub mod verdict;

pub use models::create_model;
pub use nc_core::InferenceModel;
pub use prompt::build_prompt;
pub use verdict::normalize;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings shared by remote models.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Base URL of the model API, when not the provider default
    pub model_url: Option<String>,
    /// Model used when a request does not name one
    pub default_model: Option<String>,
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_url: None,
            default_model: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub inference_config: InferenceConfig,
}

pub mod prelude {
    pub use super::{Config, InferenceConfig};
    pub use super::models::create_model;
    pub use super::verdict::normalize;
    pub use nc_core::{Completion, Error, Result, Verdict};
}
