//! Gemini provider

mod models;
pub use models::*;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::common::{build_http_client, join_url, read_raw_response, UserAgent};
use super::{InvokeOptions, Provider, RawProviderResponse};
use crate::config::ProviderConfig;
use crate::error::Result;

/// Client for the Gemini `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http_client = build_http_client(
            Some(UserAgent::for_component("gemini")),
            Some(Duration::from_secs(config.request_timeout_secs)),
        )?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        join_url(
            &self.base_url,
            &format!("models/{}:generateContent", self.model),
        )
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<RawProviderResponse> {
        let request = GenerateContentRequest::from_prompt(prompt, options);
        let started = Instant::now();

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let raw = read_raw_response(response).await?;
        debug!(
            provider = "gemini",
            model = %self.model,
            status = raw.status,
            latency_ms = started.elapsed().as_millis() as u64,
            "Provider call finished"
        );

        let text = if raw.is_success() {
            GenerateContentResponse::text_from(&raw.body)
        } else {
            None
        };
        Ok(raw.with_text(text))
    }
}
