//! Translate Relay Core Library
//!
//! This library provides the core functionality for relaying learner text to
//! external translation services:
//! - Provider adapters (Gemini, Mistral, DeepL, LibreTranslate, MyMemory)
//! - Normalization of generative-model output
//! - Ordered, first-success-wins fallback across providers

pub mod config;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod request;
pub mod util;

pub use config::{
    AppConfig, Lang, LanguageOption, ProviderKind, known_languages,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SOURCE_LANG, DEFAULT_TARGET_LANG,
};
pub use error::{Error, ErrorKind, Result};
pub use normalize::{normalize, strip_code_fence, Normalized};
pub use provider::{Provider, ProviderInfo, Translation, create_provider, create_providers};
pub use request::{Level, ProviderResult, TranslationRequest};

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Walks an ordered provider chain and returns the first success.
pub struct TranslationOrchestrator {
    providers: Vec<Arc<dyn Provider>>,
    timeout: Duration,
}

impl TranslationOrchestrator {
    /// Create an orchestrator over an explicit chain
    pub fn new(providers: Vec<Arc<dyn Provider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Create the main translation chain from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let providers = create_providers(&config.providers, config)?;
        Ok(Self::new(providers, config.request_timeout()))
    }

    /// Create the selection-translation chain from configuration
    pub fn selection_from_config(config: &AppConfig) -> Result<Self> {
        let providers = create_providers(&config.selection_providers, config)?;
        Ok(Self::new(providers, config.request_timeout()))
    }

    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    pub fn has_available_provider(&self) -> bool {
        self.providers.iter().any(|p| p.is_available())
    }

    /// Translate a request using the first provider that succeeds.
    ///
    /// Each invocation is bounded by the configured timeout; on expiry the
    /// in-flight call is dropped and the next provider is tried.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<ProviderResult> {
        let span = info_span!(
            "translate",
            request_id = %Uuid::new_v4(),
            target = %request.target_language(),
            level = %request.level(),
        );
        self.run_chain(request).instrument(span).await
    }

    async fn run_chain(&self, request: &TranslationRequest) -> Result<ProviderResult> {
        let mut attempted = Vec::new();

        for provider in &self.providers {
            let name = provider.name();
            if !provider.is_available() {
                debug!("Skipping {} (not configured)", name);
                continue;
            }

            attempted.push(name.to_string());
            debug!("Attempting {}", name);

            let outcome = tokio::time::timeout(self.timeout, provider.translate(request))
                .await
                .unwrap_or(Err(Error::ProviderTimeout { provider: name }));

            match outcome {
                Ok(translation) if !translation.translated.trim().is_empty() => {
                    info!("{} succeeded with {}", name, translation.model);
                    return Ok(ProviderResult {
                        translated_text: translation.translated,
                        back_translation: translation.back_translation,
                        provider_name: name.to_string(),
                        model: translation.model,
                    });
                }
                Ok(_) => warn!("{} returned an empty translation", name),
                Err(e) => warn!("{} failed: {}", name, e),
            }
        }

        if attempted.is_empty() {
            error!("No usable translation provider configured");
            return Err(Error::NoProvidersConfigured);
        }

        error!("All providers failed: {}", attempted.join(", "));
        Err(Error::AllProvidersFailed { attempted })
    }
}
