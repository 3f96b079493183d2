use async_trait::async_trait;
use crate::error::Result;
use crate::request::TranslationRequest;

/// Information about a provider backend
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    /// Stable identifier used in config and in results
    pub name: &'static str,
    /// Human-readable name, reported as the model for non-generative APIs
    pub display_name: &'static str,
    /// Whether this provider requires an API key
    pub requires_api_key: bool,
    /// Whether the proficiency level shapes the output
    pub level_aware: bool,
}

/// What one provider produced for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub translated: String,
    pub back_translation: Option<String>,
    /// Model that answered
    pub model: String,
}

/// Trait for translation backends
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get information about this provider
    fn info(&self) -> ProviderInfo;

    /// Get the provider name (convenience method)
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Translate the request's text into its target language
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation>;

    /// Check if the provider is usable (e.g., API key configured)
    fn is_available(&self) -> bool {
        true
    }
}
