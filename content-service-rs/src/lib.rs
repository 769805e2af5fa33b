// content-service-rs/src/lib.rs
// HTTP surface over content-sdk: generation endpoints, saved scripts and health.
// Every response body is shaped `{data, error}`.

use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use content_sdk::{ContentClient, ScriptStore};

pub mod handlers;
pub mod logging;

#[cfg(test)]
mod tests;

/// Upper bound for request bodies; scripts are long but not unbounded
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state
pub struct AppState {
    pub client: ContentClient,
    pub store: Arc<dyn ScriptStore>,
    pub started: Instant,
}

impl AppState {
    pub fn new(client: ContentClient, store: Arc<dyn ScriptStore>) -> Self {
        Self {
            client,
            store,
            started: Instant::now(),
        }
    }
}

/// Build the router with CORS, body limit and request tracing
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/generate-script", post(handlers::generate_script))
        .route("/summarize-script", post(handlers::summarize_script))
        .route("/generate-quiz", post(handlers::generate_quiz))
        .route("/scripts", get(handlers::list_scripts).post(handlers::create_script))
        .route(
            "/scripts/:id",
            get(handlers::get_script)
                .patch(handlers::update_script)
                .delete(handlers::delete_script),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
