//! Common utilities for provider clients

use std::fmt;
use std::time::Duration;

use reqwest::{header, Client};
use serde_json::Value;

use super::RawProviderResponse;
use crate::error::{Result, ServiceError};

/// UserAgent structure for identifying the client to upstream services
#[derive(Debug, Clone)]
pub struct UserAgent {
    /// Application name
    pub app_name: String,

    /// Version string
    pub version: String,

    /// Optional extra info
    pub extra: Option<String>,
}

impl Default for UserAgent {
    fn default() -> Self {
        Self {
            app_name: "podcast-studio".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            extra: Some("content-sdk".to_string()),
        }
    }
}

impl UserAgent {
    /// User agent naming the component making the call
    pub fn for_component(component: &str) -> Self {
        Self {
            extra: Some(format!("content-sdk; {}", component)),
            ..Self::default()
        }
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_name, self.version)?;

        if let Some(ref extra) = self.extra {
            write!(f, " ({})", extra)?;
        }

        Ok(())
    }
}

/// Build a standard HTTP client with default settings
pub fn build_http_client(user_agent: Option<UserAgent>, timeout: Option<Duration>) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    let ua = user_agent.unwrap_or_default().to_string();

    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_str(&ua)
            .map_err(|e| ServiceError::configuration(format!("Invalid user agent: {}", e)))?,
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout.unwrap_or_else(|| Duration::from_secs(120)))
        .gzip(true)
        .build()
        .map_err(|e| ServiceError::configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Read status and body of a provider response.
///
/// Bodies that are not JSON (gateway error pages, plain text) are kept as a
/// JSON string so the caller still sees them.
pub async fn read_raw_response(response: reqwest::Response) -> Result<RawProviderResponse> {
    let status = response.status().as_u16();
    let text = response.text().await?;

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };

    Ok(RawProviderResponse::new(status, body))
}

/// Join a base URL and a path without doubling slashes
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
