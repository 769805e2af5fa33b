//! Configuration management for the content SDK
//!
//! Values are looked up by key through a [`ConfigProvider`]. The default
//! provider reads environment variables prefixed with `CONTENT_`, so the key
//! `quiz_max_retries` maps to `CONTENT_QUIZ_MAX_RETRIES`.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::capability::Capability;
use crate::error::{Result, ServiceError};
use crate::providers::{InvokeOptions, ProviderKind};
use crate::resilience::{DelaySchedule, RetryConfig};

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get an integer configuration value
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value
            .trim()
            .parse::<i64>()
            .map_err(|e| ServiceError::configuration(format!("Invalid integer for key {}: {}", key, e)))
    }

    /// Get a float configuration value
    fn get_float(&self, key: &str) -> Result<f64> {
        let value = self.get_string(key)?;
        value
            .trim()
            .parse::<f64>()
            .map_err(|e| ServiceError::configuration(format!("Invalid float for key {}: {}", key, e)))
    }

    /// Get a boolean configuration value
    fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get_string(key)?;
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => Err(ServiceError::configuration(format!(
                "Invalid boolean value for key {}: {}",
                key, value
            ))),
        }
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get an integer configuration value with a default
    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    /// Get a float configuration value with a default
    fn get_float_or(&self, key: &str, default: f64) -> f64 {
        self.get_float(key).unwrap_or(default)
    }

    /// Get a boolean configuration value with a default
    fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Format a configuration key as an environment variable
    pub fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                ServiceError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => ServiceError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory config provider with initial values
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ServiceError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// Global default configuration provider
pub static DEFAULT_PROVIDER: Lazy<Arc<EnvConfigProvider>> =
    Lazy::new(|| Arc::new(EnvConfigProvider::new().with_prefix("CONTENT")));

/// Trait for validated configuration sections
pub trait ServiceConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;

    /// Service name
    fn service_name(&self) -> &str;
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ServiceError::configuration(format!("Invalid {} URL {}: {}", name, value, e)))
}

/// Which generative backend to call and how to reach it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    /// API key
    pub api_key: String,

    /// Base URL (can be changed for proxies)
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Upper bound for one HTTP exchange; capability timeouts are usually tighter
    pub request_timeout_secs: u64,
}

impl ProviderConfig {
    /// Defaults for a backend, without credentials
    pub fn for_kind(kind: ProviderKind) -> Self {
        Self {
            kind,
            api_key: String::new(),
            base_url: kind.default_base_url().to_string(),
            model: kind.default_model().to_string(),
            request_timeout_secs: 120,
        }
    }

    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let kind: ProviderKind = provider.get_string_or("provider", "gemini").parse()?;
        let defaults = Self::for_kind(kind);

        let config = Self {
            kind,
            api_key: provider.get_string("api_key")?,
            base_url: provider.get_string_or("base_url", &defaults.base_url),
            model: provider.get_string_or("model", &defaults.model),
            request_timeout_secs: provider
                .get_int_or("request_timeout_secs", defaults.request_timeout_secs as i64)
                .max(1) as u64,
        };

        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for ProviderConfig {
    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ServiceError::configuration(format!("{} API key is required", self.kind)));
        }

        if self.model.trim().is_empty() {
            return Err(ServiceError::configuration("Model name is required"));
        }

        validate_url("provider base", &self.base_url)
    }

    fn service_name(&self) -> &str {
        match self.kind {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Anthropic => "anthropic",
        }
    }
}

/// Retry policy and sampling options for one capability
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilitySettings {
    pub retry: RetryConfig,
    pub options: InvokeOptions,
}

impl CapabilitySettings {
    /// Built-in settings for a capability
    pub fn defaults(capability: Capability) -> Self {
        let (timeout_secs, options) = match capability {
            Capability::Script => (
                60,
                InvokeOptions {
                    max_tokens: 2048,
                    temperature: 0.8,
                    top_k: None,
                    top_p: None,
                },
            ),
            Capability::Summary => (
                30,
                InvokeOptions {
                    max_tokens: 512,
                    temperature: 0.7,
                    top_k: None,
                    top_p: None,
                },
            ),
            Capability::Quiz => (
                30,
                InvokeOptions {
                    max_tokens: 1024,
                    temperature: 0.8,
                    top_k: Some(32),
                    top_p: Some(0.9),
                },
            ),
        };

        Self {
            retry: RetryConfig {
                attempt_timeout: Some(Duration::from_secs(timeout_secs)),
                ..RetryConfig::default()
            },
            options,
        }
    }

    /// Load settings for `capability`, keyed by its name (`script_max_retries`, ...)
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P, capability: Capability) -> Result<Self> {
        let defaults = Self::defaults(capability);
        let key = |suffix: &str| format!("{}_{}", capability.as_str(), suffix);

        let max_retries = provider
            .get_int_or(&key("max_retries"), defaults.retry.max_retries as i64)
            .clamp(0, u32::MAX as i64) as u32;

        let schedule = match provider.get_string(&key("delay_table_ms")) {
            Ok(table) => parse_delay_table(&table)?,
            Err(_) => {
                let (initial, cap) = match defaults.retry.schedule {
                    DelaySchedule::Exponential { initial, cap } => (initial, cap),
                    DelaySchedule::Table(_) => (Duration::from_secs(2), Duration::from_secs(30)),
                };
                DelaySchedule::exponential(
                    millis_or(provider, &key("initial_delay_ms"), initial),
                    millis_or(provider, &key("max_delay_ms"), cap),
                )
            }
        };

        let attempt_timeout = match provider.get_int(&key("timeout_secs")) {
            Ok(secs) if secs <= 0 => None,
            Ok(secs) => Some(Duration::from_secs(secs as u64)),
            Err(_) => defaults.retry.attempt_timeout,
        };

        let options = InvokeOptions {
            max_tokens: provider
                .get_int_or(&key("max_tokens"), defaults.options.max_tokens as i64)
                .max(1) as u32,
            temperature: provider.get_float_or(&key("temperature"), defaults.options.temperature as f64) as f32,
            ..defaults.options
        };

        Ok(Self {
            retry: RetryConfig {
                max_retries,
                schedule,
                attempt_timeout,
            },
            options,
        })
    }
}

fn millis_or<P: ConfigProvider + ?Sized>(provider: &P, key: &str, default: Duration) -> Duration {
    provider
        .get_int(key)
        .ok()
        .filter(|millis| *millis >= 0)
        .map_or(default, |millis| Duration::from_millis(millis as u64))
}

/// Parse `"5000,10000,20000"` into a table schedule whose fallback is the last entry
pub fn parse_delay_table(value: &str) -> Result<DelaySchedule> {
    let delays = value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| ServiceError::configuration(format!("Invalid delay {:?}: {}", entry, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    let fallback = *delays
        .last()
        .ok_or_else(|| ServiceError::configuration("Delay table is empty"))?;

    DelaySchedule::table(delays, fallback)
}

/// Hosted database REST endpoint holding saved scripts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Project URL; the REST interface lives under `/rest/v1`
    pub url: String,

    /// Public API key sent as `apikey`
    pub anon_key: String,

    /// Table name
    pub table: String,
}

impl StoreConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let config = Self {
            url: provider.get_string("store_url")?,
            anon_key: provider.get_string("store_anon_key")?,
            table: provider.get_string_or("store_table", "podcast_scripts"),
        };

        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for StoreConfig {
    fn validate(&self) -> Result<()> {
        if self.anon_key.trim().is_empty() {
            return Err(ServiceError::configuration("Store API key is required"));
        }

        if self.table.trim().is_empty() {
            return Err(ServiceError::configuration("Store table is required"));
        }

        validate_url("store", &self.url)
    }

    fn service_name(&self) -> &str {
        "script_store"
    }
}
