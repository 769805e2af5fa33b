//! Generative-model providers
//!
//! Every backend sits behind the single [`Provider`] trait: it takes a prompt
//! and invocation options and hands back a [`RawProviderResponse`]. Transport
//! failures are errors; any HTTP answer, including error statuses, is a
//! response that the caller normalizes with [`RawProviderResponse::into_result`].

pub mod anthropic;
pub mod common;
pub mod gemini;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::mapping::{self, ProviderErrorPayload};
use crate::error::{Result, ServiceError};

/// Sampling parameters for one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_k: Option<u32>,
    pub top_p: Option<f32>,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
            top_k: None,
            top_p: None,
        }
    }
}

/// A provider's answer before interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct RawProviderResponse {
    /// HTTP status code
    pub status: u16,

    /// Parsed body; non-JSON bodies are kept as a JSON string
    pub body: Value,

    /// Generated text, when the body has the provider's success shape
    pub text: Option<String>,

    /// Structured error payload, when the body carries one
    pub error: Option<ProviderErrorPayload>,
}

impl RawProviderResponse {
    pub fn new(status: u16, body: Value) -> Self {
        let error = mapping::extract_error_payload(&body);
        Self {
            status,
            body,
            text: None,
            error,
        }
    }

    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.text = text;
        self
    }

    /// 2xx without an error payload
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.error.is_none()
    }

    /// Turn an error answer into a normalized [`ServiceError::Upstream`]
    pub fn into_result(self) -> Result<Self> {
        match mapping::normalize(self.status, self.error.as_ref()) {
            Some(upstream) => Err(ServiceError::Upstream(upstream)),
            None => Ok(self),
        }
    }
}

/// A generative-model backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Send `prompt` to the model
    async fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<RawProviderResponse>;
}

/// Supported backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Anthropic,
}

impl ProviderKind {
    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ProviderKind::Anthropic => "https://api.anthropic.com/v1",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-1.5-flash",
            ProviderKind::Anthropic => "claude-3-5-sonnet-20241022",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => f.write_str("gemini"),
            ProviderKind::Anthropic => f.write_str("anthropic"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            other => Err(ServiceError::configuration(format!(
                "Unknown provider: {}",
                other
            ))),
        }
    }
}

/// Build the configured backend
pub fn from_config(config: &ProviderConfig) -> Result<Arc<dyn Provider>> {
    match config.kind {
        ProviderKind::Gemini => Ok(Arc::new(GeminiProvider::new(config)?)),
        ProviderKind::Anthropic => Ok(Arc::new(AnthropicProvider::new(config)?)),
    }
}
