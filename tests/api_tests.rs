use assistant_backend::config::Config;
use assistant_backend::message::Role;
use assistant_backend::routes::create_router;
use assistant_backend::services::clock::FixedClock;
use assistant_backend::services::fields::CAMPAIGN_FIELDS;
use assistant_backend::services::model_client::ModelClient;
use assistant_backend::services::model_client::mock::StubModelClient;
use assistant_backend::services::model_client::openai::OpenAiClient;
use assistant_backend::state::AppState;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::util::ServiceExt;

const KEY: &str = "test-key";

fn config() -> Config {
    Config {
        server_api_key: Some(KEY.to_string()),
        ..Config::default()
    }
}

fn app_with(config: Config, model: Arc<dyn ModelClient>) -> axum::Router {
    let clock = Arc::new(FixedClock(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()));
    let state = Arc::new(AppState::new(config, model, clock).unwrap());
    create_router(state)
}

fn app(stub: &Arc<StubModelClient>) -> axum::Router {
    app_with(config(), stub.clone())
}

fn post(uri: &str, key: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn chat(content: &str) -> String {
    json!({ "messages": [{ "role": "user", "content": content }] }).to_string()
}

#[tokio::test]
async fn root_is_public() {
    let stub = Arc::new(StubModelClient::failing("unused"));
    let response = app(&stub)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"AI Service Running!");
}

#[tokio::test]
async fn missing_api_key_is_unauthorized() {
    let stub = Arc::new(StubModelClient::failing("unused"));
    let response = app(&stub)
        .oneshot(post("/api/describe", None, &chat("hello")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Unauthorized: Invalid or missing API key" })
    );
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn wrong_api_key_is_unauthorized() {
    let stub = Arc::new(StubModelClient::failing("unused"));
    let response = app(&stub)
        .oneshot(post("/api/template", Some("test-ke"), r#"{"requestText":"x"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unset_server_key_fails_closed() {
    let stub = Arc::new(StubModelClient::failing("unused"));
    let app = app_with(Config::default(), stub.clone());

    for key in [None, Some(KEY), Some("")] {
        let response = app
            .clone()
            .oneshot(post("/api/campaigns", key, &chat("opens over time")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({ "error": "API configuration error" }));
    }
}

#[tokio::test]
async fn describe_classifies_request() {
    let stub = Arc::new(StubModelClient::replying(json!({
        "chatResponse": "Sounds like a campaign report over time.",
        "reportType": "campaigns",
        "displayType": "graph"
    })));

    let response = app(&stub)
        .oneshot(post(
            "/api/describe",
            Some(KEY),
            &chat("show me opens by campaign over time"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(["campaigns", "contacts"].contains(&body["reportType"].as_str().unwrap()));
    assert!(!body["chatResponse"].as_str().unwrap().is_empty());

    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    let conversation = &calls[0].conversation;
    assert_eq!(conversation[0].role, Role::System);
    assert_eq!(conversation[1].role, Role::User);
    assert_eq!(conversation[1].content, "show me opens by campaign over time");
    assert_eq!(calls[0].options.model, "gpt-4o-mini");
    assert!(!calls[0].options.web_search);
}

#[tokio::test]
async fn campaigns_grid_passes_compliant_reply_through() {
    let reply = json!({
        "chatResponse": "Here are campaigns over 10% open rate.",
        "fields": ["Title", "Open%"],
        "startDate": "2024-12-14",
        "endDate": "2025-03-14",
        "filter": [{ "Open%": { "$gt": 10 } }]
    });
    let stub = Arc::new(StubModelClient::replying(reply.clone()));

    let response = app(&stub)
        .oneshot(post(
            "/api/campaignsgrid",
            Some(KEY),
            &chat("only campaigns over 10% open rate"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, reply);

    let system = &stub.calls()[0].conversation[0].content;
    assert!(system.contains(&serde_json::to_string(&CAMPAIGN_FIELDS[..]).unwrap()));
    assert!(system.contains("2025-03-14"));
}

#[tokio::test]
async fn conversation_order_is_preserved() {
    let stub = Arc::new(StubModelClient::replying(json!({
        "chatResponse": "ok", "xAxis": "over time", "yAxis": "Click%"
    })));
    let body = json!({ "messages": [
        { "role": "user", "content": "opens over time" },
        { "role": "assistant", "content": "Here you go." },
        { "role": "user", "content": "actually clicks" }
    ]});

    let response = app(&stub)
        .oneshot(post("/api/campaigns", Some(KEY), &body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let contents: Vec<_> = stub.calls()[0]
        .conversation
        .iter()
        .skip(1)
        .map(|m| m.content.clone())
        .collect();
    assert_eq!(contents, ["opens over time", "Here you go.", "actually clicks"]);
}

#[tokio::test]
async fn provider_failure_is_generic_500() {
    let stub = Arc::new(StubModelClient::failing("connection reset by peer at 10.0.0.1"));

    let response = app(&stub)
        .oneshot(post("/api/campaigns", Some(KEY), &chat("opens over time")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "Failed to get response from AI" }));
}

#[tokio::test]
async fn non_compliant_model_reply_is_500() {
    // graph endpoint, but the model answered with a grid shape
    let stub = Arc::new(StubModelClient::replying(json!({
        "chatResponse": "ok", "fields": ["Title"]
    })));

    let response = app(&stub)
        .oneshot(post("/api/campaigns", Some(KEY), &chat("opens over time")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "Failed to get response from AI" }));
}

#[tokio::test]
async fn invalid_body_lists_violations_without_calling_model() {
    let stub = Arc::new(StubModelClient::failing("unused"));
    let body = json!({ "messages": [{ "role": "robot", "content": "hi" }] });

    let response = app(&stub)
        .oneshot(post("/api/describe", Some(KEY), &body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid request body");
    assert_eq!(body["violations"][0]["path"], "messages[0].role");
    assert_eq!(body["violations"][0]["actual"], "\"robot\"");
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let stub = Arc::new(StubModelClient::failing("unused"));

    let response = app(&stub)
        .oneshot(post("/api/describe", Some(KEY), "{\"messages\": ["))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn contacts_use_caller_field_list() {
    let stub = Arc::new(StubModelClient::replying(json!({
        "chatResponse": "Contacts in Oslo.",
        "fields": ["Email", "City"],
        "filter": [{ "City": { "$eq": "Oslo" } }]
    })));
    let body = json!({
        "contactFields": ["Email", "City"],
        "messages": [{ "role": "user", "content": "contacts living in Oslo" }]
    });

    let response = app(&stub)
        .oneshot(post("/api/contactsgrid", Some(KEY), &body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let system = &stub.calls()[0].conversation[0].content;
    assert!(system.contains(r#"["Email","City"]"#));
    assert!(!system.contains("Opens (Unique)"));
}

#[tokio::test]
async fn contacts_require_field_list() {
    let stub = Arc::new(StubModelClient::failing("unused"));

    let response = app(&stub)
        .oneshot(post("/api/contacts", Some(KEY), &chat("contacts by city")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["violations"][0]["path"], "contactFields");
}

#[tokio::test]
async fn template_forwards_options() {
    let html = "<html><head></head><body><table class=\"dragndrop\"><tbody><tr><td>Hi</td></tr></tbody></table></body></html>";
    let stub = Arc::new(StubModelClient::replying(json!({ "generatedHtml": html })));
    let body = json!({
        "requestText": "Spring sale announcement",
        "brandImage": "https://cdn.example.com/brand.png",
        "attachedImages": ["https://cdn.example.com/1.png"],
        "fontFamily": "Georgia",
        "enableWebSearch": true
    });

    let response = app(&stub)
        .oneshot(post("/api/template", Some(KEY), &body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "generatedHtml": html }));

    let call = &stub.calls()[0];
    assert_eq!(call.options.model, "gpt-4.1");
    assert!(call.options.web_search);
    assert_eq!(call.options.image_urls, ["https://cdn.example.com/brand.png"]);
    assert!(call.conversation[0].content.contains("Web search is enabled"));
    assert_eq!(
        call.conversation[1].content,
        "Request: Spring sale announcement\nFont Family: Georgia\nWeb Search: Enabled\nAttached Images: https://cdn.example.com/1.png"
    );
}

#[tokio::test]
async fn template_rejects_bad_image_url() {
    let stub = Arc::new(StubModelClient::failing("unused"));
    let body = json!({ "requestText": "x", "brandImage": "brand.png" });

    let response = app(&stub)
        .oneshot(post("/api/template", Some(KEY), &body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["violations"][0]["path"], "brandImage");
}

#[tokio::test]
async fn missing_provider_key_is_configuration_error() {
    let config = config();
    let model = Arc::new(OpenAiClient::new(&config.openai).unwrap());

    let response = app_with(config, model)
        .oneshot(post("/api/describe", Some(KEY), &chat("hello")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "API configuration error" }));
}

#[tokio::test]
async fn preflight_needs_no_key() {
    let stub = Arc::new(StubModelClient::failing("unused"));
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/describe")
        .header("origin", "https://app.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "x-api-key,content-type")
        .body(Body::empty())
        .unwrap();

    let response = app(&stub).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let stub = Arc::new(StubModelClient::failing("unused"));
    let id = "6f1c2b1e-3d4a-4b7e-9a51-0c2f3e4d5a6b";
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", id)
        .body(Body::empty())
        .unwrap();

    let response = app(&stub).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], id);
}
