//! Caller-facing result shapes
//!
//! Capability calls end in a [`GenerationResult`]; the outer surface speaks
//! [`ApiResponse`], a `{data, error}` pair with exactly one side set.

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, UpstreamErrorKind};

/// Guidance shown when the provider kept rate limiting us
pub const RATE_LIMIT_MESSAGE: &str =
    "Rate limit exceeded after retries. Please wait a few minutes and try again.";

pub const SCRIPT_FAILURE_MESSAGE: &str = "Failed to generate script";
pub const SUMMARY_FAILURE_MESSAGE: &str = "Failed to summarize script";

/// Outcome of a capability call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerationResult<T> {
    Success { data: T },
    Failure { error_message: String },
}

impl<T> GenerationResult<T> {
    pub fn success(data: T) -> Self {
        GenerationResult::Success { data }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        GenerationResult::Failure {
            error_message: message.into(),
        }
    }

    /// Map an error to a failure with a user-facing message
    pub fn from_error(err: &ServiceError, default_message: &str) -> Self {
        Self::failure(user_message(err, default_message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            GenerationResult::Success { data } => Some(data),
            GenerationResult::Failure { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            GenerationResult::Success { .. } => None,
            GenerationResult::Failure { error_message } => Some(error_message),
        }
    }
}

/// `{data, error}` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }

    /// Wrap a fallible result, mapping the error to a user-facing message
    pub fn from_result(result: crate::error::Result<T>, default_message: &str) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::err(user_message(&err, default_message)),
        }
    }
}

impl<T> From<GenerationResult<T>> for ApiResponse<T> {
    fn from(result: GenerationResult<T>) -> Self {
        match result {
            GenerationResult::Success { data } => ApiResponse::ok(data),
            GenerationResult::Failure { error_message } => ApiResponse::err(error_message),
        }
    }
}

/// Message a user should see for `err`
pub fn user_message(err: &ServiceError, default_message: &str) -> String {
    match err.root() {
        ServiceError::RetriesExhausted { last, .. } => {
            if last.upstream_kind() == Some(UpstreamErrorKind::RateLimited) {
                RATE_LIMIT_MESSAGE.to_string()
            } else {
                err.root().to_string()
            }
        }
        ServiceError::Upstream(upstream) => match upstream.kind {
            UpstreamErrorKind::RateLimited => RATE_LIMIT_MESSAGE.to_string(),
            _ => upstream
                .message
                .clone()
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| default_message.to_string()),
        },
        ServiceError::Validation(message) | ServiceError::NotFound(message) => message.clone(),
        _ => default_message.to_string(),
    }
}
