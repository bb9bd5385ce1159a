use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::coerce::to_text_or_empty;
use crate::{Error, Result};

pub const DEFAULT_VERDICT: &str = "Uncertain";
pub const DEFAULT_CONFIDENCE: f64 = 0.5;
pub const MAX_TITLE_LENGTH: usize = 200;

/// A misinformation assessment as returned to clients.
///
/// Always fully populated: `confidence` is finite and within `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub verdict: String,
    pub confidence: f64,
    pub rationale: String,
    pub signals: Vec<String>,
}

impl Default for Verdict {
    fn default() -> Self {
        Self {
            verdict: DEFAULT_VERDICT.to_string(),
            confidence: DEFAULT_CONFIDENCE,
            rationale: String::new(),
            signals: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl From<String> for ChatRole {
    fn from(role: String) -> Self {
        if role == "user" {
            ChatRole::User
        } else {
            ChatRole::Model
        }
    }
}

impl<'de> Deserialize<'de> for ChatRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let role = Value::deserialize(deserializer)?;
        Ok(match role {
            Value::String(s) => ChatRole::from(s),
            _ => ChatRole::Model,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}

/// Any JSON value is a message: non-objects and unknown roles become model turns,
/// falsy content becomes empty text.
impl<'de> Deserialize<'de> for ChatMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let role = match value.get("role") {
            Some(Value::String(role)) => ChatRole::from(role.clone()),
            _ => ChatRole::Model,
        };
        let content = value.get("content").map(to_text_or_empty).unwrap_or_default();
        Ok(Self { role, content })
    }
}

/// A request body never fails to deserialize: a non-array `messages` is empty,
/// and falsy `model` or `system` values are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "lenient_messages")]
    pub messages: Vec<ChatMessage>,
    #[serde(default, deserialize_with = "crate::coerce::lenient_option")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "crate::coerce::lenient_option")]
    pub system: Option<String>,
}

fn lenient_messages<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<ChatMessage>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| ChatMessage::deserialize(item).map_err(serde::de::Error::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

impl ChatRequest {
    pub fn single(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            model: None,
            system: None,
        }
    }
}

/// Text produced by a model call together with the upstream body it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub text: String,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSnippet {
    pub name: String,
    pub url: String,
    pub description: String,
    pub provider: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl PageMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub date: String,
    pub content: String,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BlogPost {
    pub fn new(post: NewPost, image: Option<UploadedImage>) -> Self {
        let (image_url, image_public_id) = match image {
            Some(image) => (Some(image.secure_url), Some(image.public_id)),
            None => (None, None),
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: post.title,
            date: post.date,
            content: post.content,
            image_url,
            image_public_id,
            created_at: Utc::now(),
        }
    }
}

/// Raw blog form fields as submitted, before validation.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub title: Option<String>,
    pub date: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub date: String,
    pub content: String,
}

impl PostForm {
    pub fn validate(self) -> Result<NewPost> {
        let title = required("title", self.title)?.trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("\"title\" is not allowed to be empty".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(Error::Validation(format!(
                "\"title\" length must be less than or equal to {} characters long",
                MAX_TITLE_LENGTH
            )));
        }
        let date = required("date", self.date)?;
        let content = required("content", self.content)?;
        Ok(NewPost { title, date, content })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    match value {
        None => Err(Error::Validation(format!("\"{}\" is required", field))),
        Some(v) if v.is_empty() => Err(Error::Validation(format!(
            "\"{}\" is not allowed to be empty",
            field
        ))),
        Some(v) => Ok(v),
    }
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub secure_url: String,
    pub public_id: String,
}
