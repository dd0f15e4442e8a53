// src/state.rs
use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::services::clock::{Clock, SystemClock};
use crate::services::model_client::ModelClient;
use crate::services::model_client::openai::OpenAiClient;
use crate::services::prompt::{PromptComposer, PromptError};

pub type SharedState = Arc<AppState>;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Read-only after startup; nothing here is mutated per request.
pub struct AppState {
    pub config: Config,
    pub model: Arc<dyn ModelClient>,
    pub prompts: PromptComposer,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        config: Config,
        model: Arc<dyn ModelClient>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PromptError> {
        Ok(Self {
            config,
            model,
            prompts: PromptComposer::new()?,
            clock,
        })
    }

    /// Production wiring: OpenAI client and the system clock.
    pub fn from_config(config: Config) -> Result<Self, StartupError> {
        let model = Arc::new(OpenAiClient::new(&config.openai)?);
        Ok(Self::new(config, model, Arc::new(SystemClock))?)
    }
}
