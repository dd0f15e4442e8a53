use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::Value;
use tracing::info;

use super::parse_body;
use crate::error::AppError;
use crate::message::{ChatMessage, TemplateRequest, TemplateResponse};
use crate::services::contracts;
use crate::services::model_client::{GenerationOptions, ProviderError};
use crate::services::prompt::template_request_text;
use crate::state::SharedState;

pub async fn template_handler(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TemplateResponse>, AppError> {
    let req: TemplateRequest = parse_body(&contracts::template_request(), body)?;
    let web_search = req.enable_web_search.unwrap_or(false);

    let conversation = vec![
        ChatMessage::system(state.prompts.template(web_search)?),
        ChatMessage::user(template_request_text(&req)),
    ];

    let mut options = GenerationOptions::new(&state.config.template_model, state.config.temperature);
    options.web_search = web_search;
    // The brand image goes to the model as an image; attached images are
    // only listed by URL in the request text.
    options.image_urls = req.brand_image.into_iter().collect();

    let reply = state
        .model
        .generate_structured(&conversation, &contracts::template_response(), &options)
        .await?;
    let response: TemplateResponse = serde_json::from_value(reply)
        .map_err(|e| AppError::Provider(ProviderError::MalformedOutput(e.to_string())))?;

    info!(html_len = response.generated_html.len(), web_search, "email template generated");
    Ok(Json(response))
}
