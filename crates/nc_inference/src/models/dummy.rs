use std::fmt;
use serde_json::json;
use nc_core::{ChatRequest, ChatRole, Completion, InferenceModel, Result};

/// Offline model: replies with a fixed text, or echoes the last user message.
pub struct DummyModel {
    reply: Option<String>,
}

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self { reply: None }
    }

    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self { reply: Some(reply.into()) }
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

    async fn generate(&self, request: &ChatRequest) -> Result<Completion> {
        let text = match &self.reply {
            Some(reply) => reply.clone(),
            None => request
                .messages
                .iter()
                .rev()
                .find(|m| m.role == ChatRole::User)
                .map(|m| m.content.clone())
                .unwrap_or_default(),
        };
        let raw = json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
        });
        Ok(Completion { text, raw })
    }
}
