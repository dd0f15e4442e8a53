// src/routes/mod.rs
pub mod middleware;
pub mod reports;
pub mod template;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::schema::Schema;
use crate::services::contracts::{DisplayMode, Subject};
use crate::state::SharedState;
use reports::Endpoint;

pub fn create_router(state: SharedState) -> Router {
    let api_routes = Router::new()
        .route("/describe", reports::route(Endpoint::Describe))
        .route("/campaigns", reports::route(Endpoint::report(Subject::Campaigns, DisplayMode::Graph)))
        .route("/campaignsgrid", reports::route(Endpoint::report(Subject::Campaigns, DisplayMode::Grid)))
        .route("/contacts", reports::route(Endpoint::report(Subject::Contacts, DisplayMode::Graph)))
        .route("/contactsgrid", reports::route(Endpoint::report(Subject::Contacts, DisplayMode::Grid)))
        .route("/template", post(template::template_handler))
        .layer(from_fn_with_state(state.clone(), middleware::require_api_key));

    Router::new()
        .route("/", get(|| async { "AI Service Running!" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(middleware::request_span))
        .with_state(state)
}

/// Any origin, fixed method and header allow-lists. Sits outside the API key
/// check so preflight requests never need a key.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(middleware::API_KEY_HEADER),
        ])
}

/// Unwrap the JSON body, check it against `schema`, then decode the checked value.
pub(crate) fn parse_body<T: DeserializeOwned>(
    schema: &Schema,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(body) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let checked = schema.validate(&body)?;
    serde_json::from_value(checked).map_err(|e| AppError::BadRequest(e.to_string()))
}
