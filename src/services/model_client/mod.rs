//! Remote model access. One attempt per call, no retries.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::message::ChatMessage;
use crate::schema::{Schema, ValidationError};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Model refused: {0}")]
    Refused(String),

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Model output does not match the requested shape: {0}")]
    SchemaMismatch(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub model: String,
    pub temperature: f32,
    /// Give the model a web search tool and require it to use it.
    pub web_search: bool,
    /// Images attached to the last user message.
    pub image_urls: Vec<String>,
}

impl GenerationOptions {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
            web_search: false,
            image_urls: Vec::new(),
        }
    }
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate_structured(
        &self,
        conversation: &[ChatMessage],
        target: &Schema,
        options: &GenerationOptions,
    ) -> Result<Value, ProviderError>;
}
