//! Report routes: intent classification plus the four report extractors.
//!
//! All five share one handler. An [`Endpoint`] picks the input shape, the
//! system prompt, the field list and the output shape.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    routing::{MethodRouter, post},
};
use serde_json::Value;
use tracing::info;

use super::parse_body;
use crate::error::AppError;
use crate::message::{ChatMessage, ChatRequest, ContactsRequest};
use crate::services::contracts::{self, DisplayMode, Subject};
use crate::services::fields::campaign_fields;
use crate::services::model_client::GenerationOptions;
use crate::state::SharedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Describe,
    Report { subject: Subject, display: DisplayMode },
}

impl Endpoint {
    pub const fn report(subject: Subject, display: DisplayMode) -> Self {
        Endpoint::Report { subject, display }
    }

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Describe => "describe",
            Endpoint::Report { subject: Subject::Campaigns, display: DisplayMode::Graph } => "campaigns",
            Endpoint::Report { subject: Subject::Campaigns, display: DisplayMode::Grid } => "campaignsgrid",
            Endpoint::Report { subject: Subject::Contacts, display: DisplayMode::Graph } => "contacts",
            Endpoint::Report { subject: Subject::Contacts, display: DisplayMode::Grid } => "contactsgrid",
        }
    }
}

pub fn route(endpoint: Endpoint) -> MethodRouter<SharedState> {
    post(
        move |State(state): State<SharedState>, body: Result<Json<Value>, JsonRejection>| {
            handle(endpoint, state, body)
        },
    )
}

pub async fn handle(
    endpoint: Endpoint,
    state: SharedState,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let (system_prompt, messages, target) = match endpoint {
        Endpoint::Describe => {
            let req: ChatRequest = parse_body(&contracts::chat_request(), body)?;
            (state.prompts.describe()?, req.messages, contracts::describe_response())
        }
        Endpoint::Report { subject, display } => {
            let (fields, messages) = match subject {
                Subject::Campaigns => {
                    let req: ChatRequest = parse_body(&contracts::chat_request(), body)?;
                    (campaign_fields(), req.messages)
                }
                Subject::Contacts => {
                    let req: ContactsRequest = parse_body(&contracts::contacts_request(), body)?;
                    (req.contact_fields, req.messages)
                }
            };
            let prompt = state
                .prompts
                .report(subject, display, &fields, state.clock.today())?;
            (prompt, messages, contracts::report_response(&fields, display))
        }
    };

    let mut conversation = Vec::with_capacity(messages.len() + 1);
    conversation.push(ChatMessage::system(system_prompt));
    conversation.extend(messages);

    let options = GenerationOptions::new(&state.config.report_model, state.config.temperature);
    let reply = state
        .model
        .generate_structured(&conversation, &target, &options)
        .await?;

    info!(endpoint = endpoint.name(), turns = conversation.len() - 1, "report reply ready");
    Ok(Json(reply))
}
