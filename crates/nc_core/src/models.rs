use async_trait::async_trait;
use std::fmt;
use crate::types::{ChatRequest, Completion};
use crate::Result;

#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    /// Human readable name of the backing model
    fn name(&self) -> &str;

    /// Run a conversation through the model and return its reply text
    async fn generate(&self, request: &ChatRequest) -> Result<Completion>;
}
