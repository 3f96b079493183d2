use anyhow::{Context, Result};
use serde_json::Value;
use translate_relay_core::{AppConfig, TranslationOrchestrator, TranslationRequest};

/// Global application state.
///
/// Read-only after startup; handlers share it through an `Arc`.
pub struct AppState {
    /// Chain behind `/api/translate`
    pub translator: TranslationOrchestrator,
    /// Chain behind `/api/translate-selection`
    pub selection: TranslationOrchestrator,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let translator = TranslationOrchestrator::from_config(&config)
            .context("Failed to build translation providers")?;
        let selection = TranslationOrchestrator::selection_from_config(&config)
            .context("Failed to build selection providers")?;

        Ok(Self::with_orchestrators(config, translator, selection))
    }

    pub fn with_orchestrators(
        config: AppConfig,
        translator: TranslationOrchestrator,
        selection: TranslationOrchestrator,
    ) -> Self {
        Self {
            translator,
            selection,
            config,
        }
    }

    /// Validate raw body fields into a request, applying configured defaults.
    ///
    /// `text` arrives untyped so a number or object is an input error rather
    /// than a JSON decoding failure.
    pub fn build_request(
        &self,
        text: Option<&Value>,
        level: Option<&str>,
        target_language: Option<&str>,
    ) -> translate_relay_core::Result<TranslationRequest> {
        TranslationRequest::with_defaults(
            text.and_then(Value::as_str),
            level,
            target_language,
            self.config.default_level,
            &self.config.default_target_lang,
        )
    }
}
