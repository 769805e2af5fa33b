//! Error mapping for provider responses
//!
//! Providers report failures in different shapes. Gemini answers with
//! `{"error": {"code", "message", "status"}}`, Anthropic with
//! `{"type": "error", "error": {"type", "message"}}`, and proxies in between
//! sometimes send a bare `{"message"}` or `{"error": "..."}`. These helpers
//! pull whatever is present into a [`ProviderErrorPayload`] and classify it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{UpstreamError, UpstreamErrorKind};

/// Status tags that mean "slow down"
const RATE_LIMIT_TAGS: &[&str] = &["RESOURCE_EXHAUSTED", "RATE_LIMIT_ERROR"];

/// Status tags that mean "try again later"
const UNAVAILABLE_TAGS: &[&str] = &["UNAVAILABLE", "OVERLOADED_ERROR"];

/// Structured error payload found in a provider body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderErrorPayload {
    /// Symbolic status, e.g. `RESOURCE_EXHAUSTED` or `overloaded_error`
    pub status: Option<String>,

    /// Human-readable message
    pub message: Option<String>,
}

/// Extract an error payload from a provider body, if it carries one
pub fn extract_error_payload(body: &Value) -> Option<ProviderErrorPayload> {
    match body.get("error") {
        Some(Value::Object(error)) => {
            let status = error
                .get("status")
                .or_else(|| error.get("type"))
                .and_then(Value::as_str)
                .map(str::to_string);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string);

            Some(ProviderErrorPayload { status, message })
        }
        Some(Value::String(message)) => Some(ProviderErrorPayload {
            status: None,
            message: Some(message.clone()),
        }),
        _ => body
            .get("message")
            .and_then(Value::as_str)
            .filter(|_| body.get("candidates").is_none() && body.get("content").is_none())
            .map(|message| ProviderErrorPayload {
                status: None,
                message: Some(message.to_string()),
            }),
    }
}

/// Classify a provider failure
pub fn classify(status: u16, payload: Option<&ProviderErrorPayload>) -> UpstreamErrorKind {
    match status {
        429 => return UpstreamErrorKind::RateLimited,
        503 | 529 => return UpstreamErrorKind::Unavailable,
        _ => {}
    }

    let Some(payload) = payload else {
        return UpstreamErrorKind::Fatal;
    };

    if let Some(tag) = payload.status.as_deref() {
        let tag = tag.to_ascii_uppercase();
        if RATE_LIMIT_TAGS.contains(&tag.as_str()) {
            return UpstreamErrorKind::RateLimited;
        }
        if UNAVAILABLE_TAGS.contains(&tag.as_str()) {
            return UpstreamErrorKind::Unavailable;
        }
    }

    if let Some(message) = payload.message.as_deref() {
        let message = message.to_lowercase();
        if message.contains("quota") {
            return UpstreamErrorKind::RateLimited;
        }
        if message.contains("overloaded") {
            return UpstreamErrorKind::Unavailable;
        }
    }

    UpstreamErrorKind::Fatal
}

/// Normalize a provider answer into an [`UpstreamError`].
///
/// Returns `None` for a 2xx answer without an error payload.
pub fn normalize(status: u16, payload: Option<&ProviderErrorPayload>) -> Option<UpstreamError> {
    if (200..300).contains(&status) && payload.is_none() {
        return None;
    }

    Some(UpstreamError::new(
        classify(status, payload),
        status,
        payload.and_then(|payload| payload.message.clone()),
    ))
}
