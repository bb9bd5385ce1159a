use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;
use nc_core::{ChatRequest, ChatRole, Completion, Error, Result};
use crate::InferenceConfig;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: ChatRole,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_chat(request: &'a ChatRequest) -> Self {
        Self {
            contents: request
                .messages
                .iter()
                .map(|m| Content {
                    role: m.role,
                    parts: vec![Part { text: &m.content }],
                })
                .collect(),
            system_instruction: request
                .system
                .as_deref()
                .filter(|text| !text.is_empty())
                .map(|text| SystemInstruction { parts: vec![Part { text }] }),
        }
    }
}

/// Concatenates the text parts of the first candidate in a `generateContent` response.
pub fn extract_text(body: &Value) -> String {
    body.pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

pub struct GeminiModel {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl GeminiModel {
    pub fn new(api_key: String, config: &InferenceConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client: Arc::new(client),
            api_key,
            base_url: config
                .model_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            default_model: config
                .default_model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    fn endpoint(&self, model: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("v1beta")
            .push("models")
            .push(&format!("{}:generateContent", model));
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[async_trait]
impl nc_core::InferenceModel for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate(&self, request: &ChatRequest) -> Result<Completion> {
        let model = request
            .model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model);
        let body = GenerateContentRequest::from_chat(request);

        debug!("🤖 Sending {} message(s) to {}", request.messages.len(), model);
        let response = self.client
            .post(self.endpoint(model)?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.json::<Value>().await.unwrap_or_else(|_| json!({}));
        if !status.is_success() {
            warn!("⚠️ Gemini returned {}: {}", status, raw);
            return Err(Error::Upstream {
                status: status.as_u16(),
                raw,
            });
        }

        Ok(Completion {
            text: extract_text(&raw),
            raw,
        })
    }
}
