use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::SharedState;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared-secret check for everything under `/api`.
///
/// An unset server key is a configuration error, never an open door.
pub async fn require_api_key(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.server_api_key.as_deref() else {
        return Err(AppError::Configuration("SERVER_API_KEY is not set".to_string()));
    };

    match req.headers().get(API_KEY_HEADER) {
        Some(provided) if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) => {
            Ok(next.run(req).await)
        }
        _ => {
            warn!("rejected request with missing or invalid API key");
            Err(AppError::Unauthorized)
        }
    }
}

/// Wrap the request in a span tagged with a request id and echo the id back.
pub async fn request_span(req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let mut response = next.run(req).await;
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        info!(status = response.status().as_u16(), "request finished");
        response
    }
    .instrument(span)
    .await
}
