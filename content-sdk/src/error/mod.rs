//! Error handling for the content SDK
//!
//! Every failure the SDK can produce is a [`ServiceError`]. Provider error
//! shapes are normalized once, at the adapter boundary, into an
//! [`UpstreamError`] tagged with an [`UpstreamErrorKind`]; the retry executor
//! only ever looks at that tag (plus transport failures) to decide whether an
//! attempt may be repeated.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub mod mapping;

/// Result type for content SDK operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// User-facing message once the retry budget has been spent.
pub const RETRIES_EXHAUSTED_MESSAGE: &str =
    "Service temporarily unavailable. Please try again in a few minutes.";

/// Classification of an upstream provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamErrorKind {
    /// Provider refused the call because of quota or request rate
    RateLimited,
    /// Provider is overloaded or temporarily down
    Unavailable,
    /// Any other provider failure; repeating the call will not help
    Fatal,
}

impl UpstreamErrorKind {
    pub fn is_transient(self) -> bool {
        !matches!(self, UpstreamErrorKind::Fatal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UpstreamErrorKind::RateLimited => "rate_limited",
            UpstreamErrorKind::Unavailable => "unavailable",
            UpstreamErrorKind::Fatal => "fatal",
        }
    }
}

impl fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized provider failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    pub kind: UpstreamErrorKind,

    /// HTTP status the provider answered with
    pub status: u16,

    /// Provider's own message, when it sent one
    pub message: Option<String>,
}

impl UpstreamError {
    pub fn new(kind: UpstreamErrorKind, status: u16, message: Option<String>) -> Self {
        Self { kind, status, message }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message {
            Some(ref message) => write!(f, "{} (HTTP {}): {}", self.kind, self.status, message),
            None => write!(f, "{} (HTTP {})", self.kind, self.status),
        }
    }
}

/// Main error type for the content SDK
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Network or connection errors
    #[error("Network error: {0}")]
    Network(String),

    /// A single attempt exceeded its time limit
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Provider answered with an error
    #[error("Upstream error: {0}")]
    Upstream(UpstreamError),

    /// Transient failures outlasted the retry budget
    #[error("Service temporarily unavailable. Please try again in a few minutes.")]
    RetriesExhausted {
        attempts: u32,
        last: Box<ServiceError>,
    },

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Request validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Response parsing errors
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Resource not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Script store failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// Unexpected or internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// Errors with additional context
    #[error("{inner}")]
    WithContext {
        inner: Box<ServiceError>,
        context: ErrorContext,
    },
}

impl ServiceError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        ServiceError::Network(message.into())
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        ServiceError::Timeout(message.into())
    }

    /// Create an upstream error of the given kind
    pub fn upstream(kind: UpstreamErrorKind, status: u16, message: Option<String>) -> Self {
        ServiceError::Upstream(UpstreamError::new(kind, status, message))
    }

    /// Wrap the final failure of a retried operation
    pub fn retries_exhausted(attempts: u32, last: ServiceError) -> Self {
        ServiceError::RetriesExhausted {
            attempts,
            last: Box::new(last),
        }
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        ServiceError::Authentication(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    /// Create a parsing error
    pub fn parsing(message: impl Into<String>) -> Self {
        ServiceError::Parsing(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        ServiceError::Configuration(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        ServiceError::Storage(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::Internal(message.into())
    }

    /// Add context to an existing error
    pub fn with_context(self, context: ErrorContext) -> Self {
        ServiceError::WithContext {
            inner: Box::new(self),
            context,
        }
    }

    /// Add a single context key/value to an existing error
    pub fn with_context_value(self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        let mut context = ErrorContext::new();
        context.add(key, value);
        self.with_context(context)
    }

    /// The error with every context layer removed
    pub fn root(&self) -> &ServiceError {
        match self {
            ServiceError::WithContext { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// Get the HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServiceError::Upstream(upstream) => Some(upstream.status),
            ServiceError::WithContext { inner, context } => {
                context.status_code.or_else(|| inner.status_code())
            }
            _ => None,
        }
    }

    /// Upstream classification, looking through context layers
    pub fn upstream_kind(&self) -> Option<UpstreamErrorKind> {
        match self.root() {
            ServiceError::Upstream(upstream) => Some(upstream.kind),
            _ => None,
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Network(_) => true,
            ServiceError::Timeout(_) => true,
            ServiceError::Upstream(upstream) => upstream.kind.is_transient(),
            ServiceError::WithContext { inner, .. } => inner.is_retryable(),
            _ => false,
        }
    }
}

/// Error context information
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Service that generated the error
    pub service: String,

    /// Request timestamp
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,

    /// HTTP status code if applicable
    pub status_code: Option<u16>,

    /// Request ID for tracing
    pub request_id: Option<String>,

    /// Endpoint that was called
    pub endpoint: Option<String>,

    /// Additional context data
    pub data: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            service: "unknown".to_string(),
            timestamp: Some(chrono::Utc::now()),
            status_code: None,
            request_id: None,
            endpoint: None,
            data: HashMap::new(),
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new error context for a specific service
    pub fn for_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Add a context value
    pub fn add<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.data.insert(key.into(), value.to_string());
    }

    /// Add a context value and return self (builder pattern)
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.add(key, value);
        self
    }
}

/// Convert reqwest errors to ServiceError
impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        let context = ErrorContext::for_service("http_client");

        let service_error = if err.is_timeout() {
            ServiceError::timeout(format!("Request timed out: {}", err))
        } else if err.is_connect() || err.is_body() {
            ServiceError::network(format!("Connection error: {}", err))
        } else if err.is_redirect() {
            ServiceError::network(format!("Too many redirects: {}", err))
        } else if err.is_decode() {
            ServiceError::parsing(format!("Response decode error: {}", err))
        } else if err.is_request() {
            ServiceError::network(format!("Request failed: {}", err))
        } else {
            ServiceError::internal(format!("HTTP client error: {}", err))
        };

        match err.status() {
            Some(status) => service_error.with_context(context.status_code(status.as_u16())),
            None => service_error.with_context(context),
        }
    }
}

/// Convert serde_json errors to ServiceError
impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::parsing(format!("JSON error: {}", err))
            .with_context(ErrorContext::for_service("json"))
    }
}
