// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::schema::{ValidationError, Violation};
use crate::services::model_client::ProviderError;
use crate::services::prompt::PromptError;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Invalid or missing API key";
pub const CONFIGURATION_MESSAGE: &str = "API configuration error";
pub const PROVIDER_MESSAGE: &str = "Failed to get response from AI";

/// Every way a request can fail. Each variant maps to exactly one status
/// code and always produces a `{ "error": ... }` body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("provider error: {0}")]
    Provider(ProviderError),

    #[error("prompt error: {0}")]
    Prompt(#[from] PromptError),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(what) => AppError::Configuration(what),
            other => AppError::Provider(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Configuration(detail) => {
                error!(detail = %detail, "missing server configuration");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, CONFIGURATION_MESSAGE)
            }
            AppError::Unauthorized => error_body(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE),
            AppError::BadRequest(message) => error_body(StatusCode::BAD_REQUEST, &message),
            AppError::InvalidInput(err) => invalid_input(err.violations),
            AppError::Provider(err) => {
                error!(error = %err, "model call failed");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, PROVIDER_MESSAGE)
            }
            AppError::Prompt(err) => {
                error!(error = %err, "prompt rendering failed");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, PROVIDER_MESSAGE)
            }
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn invalid_input(violations: Vec<Violation>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Invalid request body",
            "violations": violations,
        })),
    )
        .into_response()
}
