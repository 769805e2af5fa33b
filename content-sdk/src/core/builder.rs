//! Client builder implementation
//!
//! Assembles a [`ContentClient`] from a provider, per-capability settings and
//! a quiz validator. Anything left unset falls back to built-in defaults.

use std::sync::Arc;

use crate::capability::Capability;
use crate::client::ContentClient;
use crate::config::{CapabilitySettings, ConfigProvider, ProviderConfig, ServiceConfig};
use crate::error::{Result, ServiceError};
use crate::providers::{self, Provider};
use crate::quiz::{Quiz, QuizValidator};
use crate::resilience::RetryConfig;

/// Builder for [`ContentClient`]
#[derive(Default)]
pub struct ClientBuilder {
    /// Ready-made provider, takes precedence over `provider_config`
    provider: Option<Arc<dyn Provider>>,

    /// Configuration used to build a provider
    provider_config: Option<ProviderConfig>,

    script: Option<CapabilitySettings>,
    summary: Option<CapabilitySettings>,
    quiz: Option<CapabilitySettings>,

    validator: Option<QuizValidator>,
}

impl ClientBuilder {
    /// Create a new client builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load provider and capability settings from a config provider
    pub fn from_config<P: ConfigProvider + ?Sized>(config: &P) -> Result<Self> {
        let mut builder = Self::new().provider_config(ProviderConfig::from_provider(config)?);

        for capability in Capability::ALL {
            builder = builder.settings(capability, CapabilitySettings::from_provider(config, capability)?);
        }

        Ok(builder)
    }

    /// Use an existing provider
    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build the provider from configuration
    pub fn provider_config(mut self, config: ProviderConfig) -> Self {
        self.provider_config = Some(config);
        self
    }

    /// Replace all settings for one capability
    pub fn settings(mut self, capability: Capability, settings: CapabilitySettings) -> Self {
        *self.slot(capability) = Some(settings);
        self
    }

    /// Replace only the retry policy for one capability
    pub fn retry_config(mut self, capability: Capability, retry: RetryConfig) -> Self {
        let slot = self.slot(capability);
        let mut settings = slot
            .take()
            .unwrap_or_else(|| CapabilitySettings::defaults(capability));
        settings.retry = retry;
        *slot = Some(settings);
        self
    }

    /// Apply the same retry policy to every capability
    pub fn retry_config_all(mut self, retry: RetryConfig) -> Self {
        for capability in Capability::ALL {
            self = self.retry_config(capability, retry.clone());
        }
        self
    }

    /// Use a custom quiz validator
    pub fn validator(mut self, validator: QuizValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Serve `quiz` whenever model output is unusable
    pub fn fallback_quiz(mut self, quiz: Quiz) -> Self {
        self.validator = Some(QuizValidator::new(quiz));
        self
    }

    fn slot(&mut self, capability: Capability) -> &mut Option<CapabilitySettings> {
        match capability {
            Capability::Script => &mut self.script,
            Capability::Summary => &mut self.summary,
            Capability::Quiz => &mut self.quiz,
        }
    }

    /// Build the client
    pub fn build(self) -> Result<ContentClient> {
        let provider = match (self.provider, self.provider_config) {
            (Some(provider), _) => provider,
            (None, Some(config)) => {
                config.validate()?;
                providers::from_config(&config)?
            }
            (None, None) => {
                return Err(ServiceError::configuration(
                    "A provider or provider configuration is required",
                ))
            }
        };

        Ok(ContentClient::from_parts(
            provider,
            self.script.unwrap_or_else(|| CapabilitySettings::defaults(Capability::Script)),
            self.summary.unwrap_or_else(|| CapabilitySettings::defaults(Capability::Summary)),
            self.quiz.unwrap_or_else(|| CapabilitySettings::defaults(Capability::Quiz)),
            self.validator.unwrap_or_default(),
        ))
    }
}
