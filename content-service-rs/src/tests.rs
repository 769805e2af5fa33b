// content-service-rs/src/tests.rs
// Router tests against a scripted provider and the in-memory store

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use content_sdk::quiz::FALLBACK_QUIZ;
use content_sdk::{
    ContentClient, InvokeOptions, MemoryScriptStore, Provider, RawProviderResponse, RetryConfig,
};

use crate::{router, AppState};

/// Provider answering from a fixed queue; an empty queue answers 500
struct ScriptedProvider {
    responses: Mutex<VecDeque<RawProviderResponse>>,
    calls: Mutex<usize>,
}

impl ScriptedProvider {
    fn answering(responses: Vec<RawProviderResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn invoke(&self, _prompt: &str, _options: &InvokeOptions) -> content_sdk::Result<RawProviderResponse> {
        *self.calls.lock().unwrap() += 1;
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| RawProviderResponse::new(500, Value::Null)))
    }
}

fn text(text: &str) -> RawProviderResponse {
    RawProviderResponse::new(200, json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}))
        .with_text(Some(text.to_string()))
}

fn app(provider: Arc<ScriptedProvider>) -> Router {
    let client = ContentClient::builder()
        .provider(provider)
        .retry_config_all(RetryConfig {
            max_retries: 0,
            ..RetryConfig::default()
        })
        .build()
        .unwrap();

    router(Arc::new(AppState::new(client, Arc::new(MemoryScriptStore::new()))))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_generate_script_success() {
    let provider = ScriptedProvider::answering(vec![text("Hello")]);
    let app = app(provider.clone());

    let (status, body) = send(&app, post("/generate-script", json!({"topic": "Tides", "tone": "formal"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": "Hello", "error": null}));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_generate_script_requires_topic() {
    let provider = ScriptedProvider::answering(vec![]);
    let app = app(provider.clone());

    let (status, body) = send(&app, post("/generate-script", json!({"tone": "formal"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"data": null, "error": "Topic is required"}));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_fatal_provider_error_is_bad_gateway() {
    let provider = ScriptedProvider::answering(vec![RawProviderResponse::new(
        400,
        json!({"error": {"message": "API key not valid", "status": "INVALID_ARGUMENT"}}),
    )]);
    let app = app(provider);

    let (status, body) = send(&app, post("/summarize-script", json!({"script": "Once upon a time"}))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["error"], "API key not valid");
}

#[tokio::test]
async fn test_generate_quiz_always_answers() {
    let provider = ScriptedProvider::answering(vec![text("not json at all")]);
    let app = app(provider);
    let fallback = serde_json::to_value(&*FALLBACK_QUIZ).unwrap();

    let (status, body) = send(&app, post("/generate-quiz", json!({"script": "A script"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": fallback, "error": null}));

    let malformed = Request::builder()
        .method("POST")
        .uri("/generate-quiz")
        .header("content-type", "application/json")
        .body(Body::from("{"))
        .unwrap();
    let (status, body) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], fallback);
}

#[tokio::test]
async fn test_generate_quiz_parses_model_output() {
    let provider = ScriptedProvider::answering(vec![text(
        "Sure!\n```json\n[{\"question\":\"Q1\",\"options\":[\"A\",\"B\"],\"correctAnswer\":1}]\n```",
    )]);
    let app = app(provider);

    let (status, body) = send(&app, post("/generate-quiz", json!({"script": "A script"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([{"question": "Q1", "options": ["A", "B"], "correctAnswer": 1}])
    );
}

#[tokio::test]
async fn test_script_lifecycle() {
    let app = app(ScriptedProvider::answering(vec![]));

    let (status, body) = send(
        &app,
        post(
            "/scripts",
            json!({"user_id": "user-1", "title": "Tides", "prompt": "Tides", "script": "Welcome."}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let patch = Request::builder()
        .method("PATCH")
        .uri(format!("/scripts/{}", id))
        .header("content-type", "application/json")
        .body(Body::from(json!({"summary": "About tides"}).to_string()))
        .unwrap();
    let (status, body) = send(&app, patch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["summary"], "About tides");

    let (status, body) = send(&app, get("/scripts?user_id=user-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/scripts/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get(&format!("/scripts/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn test_script_store_input_errors() {
    let app = app(ScriptedProvider::answering(vec![]));

    let (status, _) = send(&app, get("/scripts")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, post("/scripts", json!({"user_id": "user-1", "title": "", "script": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");
}

#[tokio::test]
async fn test_health() {
    let app = app(ScriptedProvider::answering(vec![]));

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["provider"], "scripted");
    assert_eq!(body["data"]["store"], "memory");
    assert_eq!(body["error"], Value::Null);
}
