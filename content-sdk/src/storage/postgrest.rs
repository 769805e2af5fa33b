use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::{NewScript, ScriptRecord, ScriptStore, ScriptUpdate};
use crate::config::{ServiceConfig, StoreConfig};
use crate::core::TokenSource;
use crate::error::mapping::extract_error_payload;
use crate::error::{ErrorContext, Result, ServiceError};
use crate::providers::common::{build_http_client, join_url, UserAgent};

/// Script store backed by the hosted database's REST interface
#[derive(Clone)]
pub struct PostgrestScriptStore {
    http_client: Client,
    table_url: String,
    anon_key: String,
    tokens: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for PostgrestScriptStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestScriptStore")
            .field("table_url", &self.table_url)
            .finish()
    }
}

impl PostgrestScriptStore {
    pub fn new(config: &StoreConfig, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        config.validate()?;

        let http_client = build_http_client(
            Some(UserAgent::for_component("script-store")),
            Some(Duration::from_secs(30)),
        )?;

        Ok(Self {
            http_client,
            table_url: join_url(&config.url, &format!("rest/v1/{}", config.table)),
            anon_key: config.anon_key.clone(),
            tokens,
        })
    }

    async fn request(&self, method: Method) -> Result<RequestBuilder> {
        let token = self.tokens.bearer_token().await?;

        Ok(self
            .http_client
            .request(method, &self.table_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token))
    }

    /// Send and decode the returned rows
    async fn rows(&self, request: RequestBuilder, operation: &str) -> Result<Vec<ScriptRecord>> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(store_error(status, &body, operation));
        }

        let rows: Vec<ScriptRecord> = response.json().await?;
        debug!(operation, rows = rows.len(), "Script store call finished");
        Ok(rows)
    }
}

fn store_error(status: StatusCode, body: &str, operation: &str) -> ServiceError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| extract_error_payload(&json))
        .and_then(|payload| payload.message)
        .unwrap_or_else(|| status.to_string());

    let error = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::authentication(message),
        StatusCode::NOT_FOUND => ServiceError::not_found(message),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT => ServiceError::validation(message),
        _ => ServiceError::storage(message),
    };

    error.with_context(
        ErrorContext::for_service("script_store")
            .status_code(status.as_u16())
            .endpoint(operation.to_string()),
    )
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::not_found(format!("Script {} not found", id))
}

#[async_trait]
impl ScriptStore for PostgrestScriptStore {
    fn name(&self) -> &'static str {
        "postgrest"
    }

    async fn create(&self, script: NewScript) -> Result<ScriptRecord> {
        script.validate()?;

        let request = self
            .request(Method::POST)
            .await?
            .header("Prefer", "return=representation")
            .json(&script);

        self.rows(request, "create")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::storage("Insert returned no rows"))
    }

    async fn get(&self, id: &str) -> Result<ScriptRecord> {
        let request = self
            .request(Method::GET)
            .await?
            .query(&[("id", format!("eq.{}", id)), ("select", "*".to_string())]);

        self.rows(request, "get")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| not_found(id))
    }

    async fn update(&self, id: &str, update: ScriptUpdate) -> Result<ScriptRecord> {
        if update.is_empty() {
            return self.get(id).await;
        }

        let request = self
            .request(Method::PATCH)
            .await?
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&update);

        self.rows(request, "update")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE)
            .await?
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation");

        let deleted = self.rows(request, "delete").await?;
        if deleted.is_empty() {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ScriptRecord>> {
        let request = self.request(Method::GET).await?.query(&[
            ("user_id", format!("eq.{}", user_id)),
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ]);

        self.rows(request, "list_by_user").await
    }
}
