//! Core abstractions shared by clients
//!
//! - `TokenSource`: supplies the bearer credential for authenticated calls
//! - `ClientBuilder`: builder for [`ContentClient`](crate::client::ContentClient)

pub mod builder;
pub use builder::ClientBuilder;

use async_trait::async_trait;

use crate::error::{Result, ServiceError};

/// Supplier of bearer credentials.
///
/// Sessions are owned by the identity provider; implementations only hand out
/// the current token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer_token(&self) -> Result<String>;
}

/// Fixed token, e.g. a project's public key or a service credential
#[derive(Clone)]
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl std::fmt::Debug for StaticTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenSource")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn bearer_token(&self) -> Result<String> {
        if self.token.trim().is_empty() {
            return Err(ServiceError::authentication("No bearer token configured"));
        }
        Ok(self.token.clone())
    }
}
