//! Anthropic provider

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

/// API version sent with every request
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages endpoint
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http_client = build_http_client(
            Some(UserAgent::for_component("anthropic")),
            Some(Duration::from_secs(config.request_timeout_secs)),
        )?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<RawProviderResponse> {
        let request = MessagesRequest::from_prompt(&self.model, prompt, options);
        let started = Instant::now();

        let response = self
            .http_client
            .post(join_url(&self.base_url, "messages"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let raw = read_raw_response(response).await?;
        debug!(
            provider = "anthropic",
            model = %self.model,
            status = raw.status,
            latency_ms = started.elapsed().as_millis() as u64,
            "Provider call finished"
        );

        let text = if raw.is_success() {
            MessagesResponse::text_from(&raw.body)
        } else {
            None
        };
        Ok(raw.with_text(text))
    }
}
