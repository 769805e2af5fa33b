// content-service-rs/src/handlers.rs
// Request handlers. Generation failures are already user-facing messages by
// the time they reach this layer; store errors go through `ApiResponse::from_result`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use content_sdk::client::{SCRIPT_REQUIRED_MESSAGE, TOPIC_REQUIRED_MESSAGE};
use content_sdk::{ApiResponse, GenerationResult, NewScript, Quiz, ScriptRecord, ScriptUpdate, ServiceError};

use crate::AppState;

/// Status code plus `{data, error}` body
pub type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

pub const USER_ID_REQUIRED_MESSAGE: &str = "user_id query parameter is required";
const STORE_FAILURE_MESSAGE: &str = "Failed to access saved scripts";

#[derive(Debug, Deserialize)]
pub struct GenerateScriptBody {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub tone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScriptBody {
    #[serde(default)]
    pub script: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub service_name: String,
    pub uptime_seconds: u64,
    pub provider: String,
    pub store: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
    pub id: String,
}

fn ok<T>(data: T) -> Reply<T> {
    (StatusCode::OK, Json(ApiResponse::ok(data)))
}

fn fail<T>(status: StatusCode, message: impl Into<String>) -> Reply<T> {
    (status, Json(ApiResponse::err(message)))
}

fn bad_json<T>(rejection: JsonRejection) -> Reply<T> {
    fail(StatusCode::BAD_REQUEST, rejection.body_text())
}

fn generation_reply(result: GenerationResult<String>) -> Reply<String> {
    let status = if result.is_success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(result.into()))
}

fn store_reply<T>(result: content_sdk::Result<T>) -> Reply<T> {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(err) => match err.root() {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => {
                warn!(error = %err, "Script store call failed");
                StatusCode::BAD_GATEWAY
            }
        },
    };
    (status, Json(ApiResponse::from_result(result, STORE_FAILURE_MESSAGE)))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Reply<HealthReport> {
    ok(HealthReport {
        healthy: true,
        service_name: config_rs::get_formatted_service_name("CONTENT"),
        uptime_seconds: state.started.elapsed().as_secs(),
        provider: state.client.provider_name().to_string(),
        store: state.store.name().to_string(),
    })
}

pub async fn generate_script(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerateScriptBody>, JsonRejection>,
) -> Reply<String> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_json(rejection),
    };

    if body.topic.trim().is_empty() {
        return fail(StatusCode::BAD_REQUEST, TOPIC_REQUIRED_MESSAGE);
    }

    let tone = body.tone.as_deref().unwrap_or_default();
    info!(tone, topic_chars = body.topic.chars().count(), "Generating script");
    generation_reply(state.client.generate_script(&body.topic, tone).await)
}

pub async fn summarize_script(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ScriptBody>, JsonRejection>,
) -> Reply<String> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_json(rejection),
    };

    if body.script.trim().is_empty() {
        return fail(StatusCode::BAD_REQUEST, SCRIPT_REQUIRED_MESSAGE);
    }

    generation_reply(state.client.summarize_script(&body.script).await)
}

/// Always answers 200 with a quiz; an unreadable body counts as a blank script
pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ScriptBody>, JsonRejection>,
) -> Reply<Quiz> {
    let script = match body {
        Ok(Json(body)) => body.script,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "Unreadable quiz request");
            String::new()
        }
    };

    ok(state.client.generate_quiz(&script).await)
}

pub async fn list_scripts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Reply<Vec<ScriptRecord>> {
    match query.user_id.filter(|id| !id.trim().is_empty()) {
        Some(user_id) => store_reply(state.store.list_by_user(&user_id).await),
        None => fail(StatusCode::BAD_REQUEST, USER_ID_REQUIRED_MESSAGE),
    }
}

pub async fn create_script(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewScript>, JsonRejection>,
) -> Reply<ScriptRecord> {
    match body {
        Ok(Json(script)) => store_reply(state.store.create(script).await),
        Err(rejection) => bad_json(rejection),
    }
}

pub async fn get_script(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Reply<ScriptRecord> {
    store_reply(state.store.get(&id).await)
}

pub async fn update_script(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ScriptUpdate>, JsonRejection>,
) -> Reply<ScriptRecord> {
    match body {
        Ok(Json(update)) => store_reply(state.store.update(&id, update).await),
        Err(rejection) => bad_json(rejection),
    }
}

pub async fn delete_script(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Reply<Deleted> {
    let result = state.store.delete(&id).await;
    store_reply(result.map(|()| Deleted { id }))
}
