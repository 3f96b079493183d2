mod traits;
mod http;
mod prompt;
mod gemini;
mod mistral;
mod deepl;
mod libretranslate;
mod mymemory;

pub use traits::{Provider, ProviderInfo, Translation};
pub use prompt::build_prompt;
pub use gemini::GeminiProvider;
pub use mistral::MistralProvider;
pub use deepl::DeepLProvider;
pub use libretranslate::LibreTranslateProvider;
pub use mymemory::MyMemoryProvider;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{AppConfig, Lang, ProviderKind};
use crate::error::{Error, Result};
use crate::normalize::normalize;

/// Create one provider from configuration
pub fn create_provider(kind: ProviderKind, config: &AppConfig) -> Result<Arc<dyn Provider>> {
    let timeout = config.request_timeout();
    let provider: Arc<dyn Provider> = match kind {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(&config.gemini, timeout)?),
        ProviderKind::Mistral => Arc::new(MistralProvider::new(&config.mistral, timeout)?),
        ProviderKind::DeepL => Arc::new(DeepLProvider::new(&config.deepl, timeout)?),
        ProviderKind::LibreTranslate => {
            Arc::new(LibreTranslateProvider::new(&config.libretranslate, timeout)?)
        }
        ProviderKind::MyMemory => Arc::new(MyMemoryProvider::new(
            &config.mymemory,
            config.source_lang.clone(),
            timeout,
        )?),
    };
    Ok(provider)
}

/// Create a provider chain, preserving the configured order.
///
/// Unavailable providers stay in the chain so callers can report them;
/// the orchestrator skips them without a network call.
pub fn create_providers(kinds: &[ProviderKind], config: &AppConfig) -> Result<Vec<Arc<dyn Provider>>> {
    kinds
        .iter()
        .map(|&kind| {
            let provider = create_provider(kind, config)?;
            if !provider.is_available() {
                warn!("Provider {} is not configured and will be skipped", kind);
            }
            Ok(provider)
        })
        .collect()
}

/// Share of the adapter budget each model gets.
///
/// A hanging first model is cut off early enough for the next one to run
/// inside the orchestrator's timeout.
pub(crate) fn model_budget(total: Duration, models: usize) -> Duration {
    u32::try_from(models)
        .ok()
        .filter(|&n| n > 1)
        .map_or(total, |n| total / n)
}

/// Try each model in order; the adapter fails only when every model did.
///
/// Each model call is bounded by `budget`.
pub(crate) async fn try_models<'m, F, Fut>(
    provider: &'static str,
    models: &'m [String],
    budget: Duration,
    mut call: F,
) -> Result<Translation>
where
    F: FnMut(&'m str) -> Fut,
    Fut: Future<Output = Result<Translation>>,
{
    let mut last_error = None;

    for model in models {
        debug!("{}: trying model {}", provider, model);
        let outcome = tokio::time::timeout(budget, call(model.as_str()))
            .await
            .unwrap_or(Err(Error::ProviderTimeout { provider }));
        match outcome {
            Ok(translation) => return Ok(translation),
            Err(e) => {
                warn!("{}: model {} failed: {}", provider, model, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::invalid_response(provider, "no models configured")))
}

/// Normalize raw model output, rejecting an empty result.
pub(crate) fn translation_from_model_output(
    provider: &'static str,
    raw: &str,
    target: &Lang,
    model: &str,
) -> Result<Translation> {
    let normalized = normalize(raw, target);
    if normalized.translated.is_empty() {
        return Err(Error::invalid_response(provider, "empty translation"));
    }
    Ok(Translation {
        translated: normalized.translated,
        back_translation: normalized.back_translation,
        model: model.to_string(),
    })
}

/// Wrap a plain translation field from a non-generative API.
pub(crate) fn plain_translation(provider: &'static str, model: &str, text: &str) -> Result<Translation> {
    let translated = text.trim();
    if translated.is_empty() {
        return Err(Error::invalid_response(provider, "empty translation"));
    }
    Ok(Translation {
        translated: translated.to_string(),
        back_translation: None,
        model: model.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_keeps_order_and_unavailable_entries() {
        let config = AppConfig::default();
        let chain = create_providers(&config.providers, &config).unwrap();
        let names: Vec<_> = chain.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["gemini", "mistral", "deepl", "libretranslate", "mymemory"]);

        // Only the keyless provider is usable with an empty config.
        let available: Vec<_> = chain.iter().filter(|p| p.is_available()).map(|p| p.name()).collect();
        assert_eq!(available, vec!["mymemory"]);
    }

    #[tokio::test]
    async fn test_try_models_falls_through() {
        let models = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut seen = Vec::new();

        let result = try_models("test", &models, Duration::from_secs(5), |model| {
            seen.push(model.to_string());
            async move {
                if model == "b" {
                    Ok(Translation {
                        translated: "ok".to_string(),
                        back_translation: None,
                        model: model.to_string(),
                    })
                } else {
                    Err(Error::invalid_response("test", "nope"))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result.model, "b");
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_try_models_reports_last_error() {
        let models = vec!["a".to_string(), "b".to_string()];
        let err = try_models("test", &models, Duration::from_secs(5), |model| async move {
            Err(Error::ProviderStatus {
                provider: "test",
                status: 500,
                body: model.to_string(),
            })
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::ProviderStatus { ref body, .. } if body == "b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_model_leaves_time_for_next() {
        let models = vec!["slow".to_string(), "fast".to_string()];
        let budget = model_budget(Duration::from_secs(30), models.len());
        assert_eq!(budget, Duration::from_secs(15));

        let started = tokio::time::Instant::now();
        let result = try_models("test", &models, budget, |model| async move {
            if model == "slow" {
                std::future::pending::<()>().await;
            }
            Ok(Translation {
                translated: "ok".to_string(),
                back_translation: None,
                model: model.to_string(),
            })
        })
        .await
        .unwrap();

        assert_eq!(result.model, "fast");
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn test_model_budget_single_model_keeps_total() {
        assert_eq!(model_budget(Duration::from_secs(30), 1), Duration::from_secs(30));
        assert_eq!(model_budget(Duration::from_secs(30), 0), Duration::from_secs(30));
        assert_eq!(model_budget(Duration::from_secs(30), 3), Duration::from_secs(10));
    }

    #[test]
    fn test_empty_model_output_rejected() {
        let err = translation_from_model_output("gemini", "```json\n{\"translated\": \"  \"}\n```", &Lang::new("fi"), "m")
            .unwrap_err();
        assert!(matches!(err, Error::ProviderResponse { .. }));
    }
}
