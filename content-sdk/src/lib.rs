//! # Content SDK
//!
//! Resilient upstream-call layer for podcast content generation.
//!
//! This crate provides:
//!
//! - A retry executor with capped, non-decreasing backoff schedules
//! - Normalization of provider errors into rate-limited, unavailable and fatal
//! - Gemini and Anthropic providers behind a single `Provider` trait
//! - Script, summary and quiz adapters returning caller-friendly results
//! - A quiz validator that always yields a usable quiz
//! - Script persistence over the hosted database's REST interface
//!
//! ## Architecture
//!
//! - `ContentClient`: capability adapters (`generate_script`, `summarize_script`, `generate_quiz`)
//! - `Provider`: transport to a generative model, returning `RawProviderResponse`
//! - `RetryExecutor`: runs provider calls under a per-capability `RetryConfig`
//! - `QuizValidator`: extracts and coerces quiz JSON, falling back to a fixed quiz
//! - `ApiResponse`: `{data, error}` shape for callers
//! - `ScriptStore`: CRUD over saved scripts

pub mod capability;
pub use capability::{Capability, GenerationPayload, GenerationRequest, Tone};

pub mod client;
pub use client::ContentClient;

pub mod core;
pub use core::{ClientBuilder, StaticTokenSource, TokenSource};

pub mod error;
pub use error::{ErrorContext, Result, ServiceError, UpstreamError, UpstreamErrorKind};

pub mod providers;
pub use providers::{InvokeOptions, Provider, ProviderKind, RawProviderResponse};

pub mod quiz;
pub use quiz::{Quiz, QuizQuestion, QuizRejection, QuizValidator};

pub mod resilience;
pub use resilience::{DelaySchedule, RetryConfig, RetryExecutor};

pub mod response;
pub use response::{ApiResponse, GenerationResult};

pub mod storage;
pub use storage::{MemoryScriptStore, NewScript, PostgrestScriptStore, ScriptRecord, ScriptStore, ScriptUpdate};

pub mod config;
pub use config::{CapabilitySettings, ConfigProvider, ProviderConfig, ServiceConfig, StoreConfig};

pub mod prompts;

// Utility module for common functionality
mod util;

#[cfg(test)]
mod tests;

/// Create a new client builder
pub fn client() -> ClientBuilder {
    ClientBuilder::new()
}
