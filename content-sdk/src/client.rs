//! Capability adapters
//!
//! [`ContentClient`] turns a topic or script into a prompt, calls the provider
//! through the retry executor and interprets the answer. Script and summary
//! calls end in a [`GenerationResult`]; quiz calls always produce a [`Quiz`].

use std::sync::Arc;

use tracing::{debug, info_span, warn, Instrument};

use crate::capability::{Capability, GenerationRequest, Tone};
use crate::config::{CapabilitySettings, ConfigProvider};
use crate::core::ClientBuilder;
use crate::error::{ErrorContext, Result};
use crate::providers::{Provider, RawProviderResponse};
use crate::quiz::{Quiz, QuizValidator};
use crate::resilience::RetryExecutor;
use crate::response::{GenerationResult, SCRIPT_FAILURE_MESSAGE, SUMMARY_FAILURE_MESSAGE};
use crate::util::{generate_request_id, sanitize_for_logging};

/// Returned when the model answered with no script text
pub const SCRIPT_PLACEHOLDER: &str = "No script generated";

/// Returned when the model answered with no summary text
pub const SUMMARY_PLACEHOLDER: &str = "No summary generated";

pub const TOPIC_REQUIRED_MESSAGE: &str = "Topic is required";
pub const SCRIPT_REQUIRED_MESSAGE: &str = "Script is required";

/// Client for the script, summary and quiz capabilities
#[derive(Clone)]
pub struct ContentClient {
    provider: Arc<dyn Provider>,
    script: CapabilitySettings,
    summary: CapabilitySettings,
    quiz: CapabilitySettings,
    validator: QuizValidator,
}

impl std::fmt::Debug for ContentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentClient")
            .field("provider", &self.provider.name())
            .field("script", &self.script)
            .field("summary", &self.summary)
            .field("quiz", &self.quiz)
            .finish()
    }
}

impl ContentClient {
    /// Client with default settings for every capability
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self::from_parts(
            provider,
            CapabilitySettings::defaults(Capability::Script),
            CapabilitySettings::defaults(Capability::Summary),
            CapabilitySettings::defaults(Capability::Quiz),
            QuizValidator::default(),
        )
    }

    pub(crate) fn from_parts(
        provider: Arc<dyn Provider>,
        script: CapabilitySettings,
        summary: CapabilitySettings,
        quiz: CapabilitySettings,
        validator: QuizValidator,
    ) -> Self {
        Self {
            provider,
            script,
            summary,
            quiz,
            validator,
        }
    }

    /// Create a new builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Build a client entirely from configuration
    pub fn from_config<P: ConfigProvider + ?Sized>(config: &P) -> Result<Self> {
        ClientBuilder::from_config(config)?.build()
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn settings(&self, capability: Capability) -> &CapabilitySettings {
        match capability {
            Capability::Script => &self.script,
            Capability::Summary => &self.summary,
            Capability::Quiz => &self.quiz,
        }
    }

    pub fn validator(&self) -> &QuizValidator {
        &self.validator
    }

    /// Generate a podcast script about `topic`; unknown tones read as conversational
    pub async fn generate_script(&self, topic: &str, tone: &str) -> GenerationResult<String> {
        let request = GenerationRequest::script(topic, Tone::from_name(tone));
        if request.is_blank() {
            return GenerationResult::failure(TOPIC_REQUIRED_MESSAGE);
        }

        self.generate_text(&request, SCRIPT_PLACEHOLDER, SCRIPT_FAILURE_MESSAGE)
            .await
    }

    /// Summarize a script in a few paragraphs
    pub async fn summarize_script(&self, script: &str) -> GenerationResult<String> {
        let request = GenerationRequest::summary(script);
        if request.is_blank() {
            return GenerationResult::failure(SCRIPT_REQUIRED_MESSAGE);
        }

        self.generate_text(&request, SUMMARY_PLACEHOLDER, SUMMARY_FAILURE_MESSAGE)
            .await
    }

    /// Generate a comprehension quiz for a script.
    ///
    /// Never fails: provider errors, exhausted retries and unusable output all
    /// yield the fallback quiz.
    pub async fn generate_quiz(&self, script: &str) -> Quiz {
        let request = GenerationRequest::quiz(script);
        if request.is_blank() {
            warn!("Quiz requested for a blank script, serving fallback quiz");
            return self.validator.fallback();
        }

        match self.call(&request).await {
            Ok(raw) => self.validator.resolve(raw.text.as_deref().unwrap_or_default()),
            Err(err) => {
                warn!(
                    error = %sanitize_for_logging(&err.to_string()),
                    "Quiz generation failed, serving fallback quiz"
                );
                self.validator.fallback()
            }
        }
    }

    async fn generate_text(
        &self,
        request: &GenerationRequest,
        placeholder: &str,
        failure_message: &str,
    ) -> GenerationResult<String> {
        match self.call(request).await {
            Ok(raw) => {
                let text = raw
                    .text
                    .filter(|text| !text.trim().is_empty())
                    .unwrap_or_else(|| placeholder.to_string());
                GenerationResult::success(text)
            }
            Err(err) => {
                warn!(
                    capability = %request.capability,
                    error = %sanitize_for_logging(&err.to_string()),
                    "Generation failed"
                );
                GenerationResult::from_error(&err, failure_message)
            }
        }
    }

    /// Invoke the provider for `request` under the capability's retry policy
    pub async fn call(&self, request: &GenerationRequest) -> Result<RawProviderResponse> {
        let settings = self.settings(request.capability);
        let request_id = generate_request_id();
        let span = info_span!(
            "generation",
            capability = %request.capability,
            provider = self.provider.name(),
            request_id = %request_id
        );

        let executor = RetryExecutor::new(settings.retry.clone()).with_operation(request.capability.as_str());
        let prompt = request.prompt();
        let prompt = prompt.as_str();
        let provider = &self.provider;
        let options = &settings.options;

        async move {
            debug!(prompt_chars = prompt.chars().count(), "Dispatching generation request");

            executor
                .execute(move || async move { provider.invoke(prompt, options).await?.into_result() })
                .await
                .map_err(|err| {
                    err.with_context(
                        ErrorContext::for_service(provider.name())
                            .request_id(request_id.clone())
                            .with("capability", request.capability),
                    )
                })
        }
        .instrument(span)
        .await
    }
}
