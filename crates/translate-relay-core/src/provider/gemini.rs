use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::GeminiConfig;
use crate::error::{Error, Result};
use crate::request::TranslationRequest;
use super::http::{build_client, ensure_success, has_key, read_json, require_key, send_error};
use super::traits::{Provider, ProviderInfo, Translation};
use super::{build_prompt, model_budget, translation_from_model_output, try_models};

const NAME: &str = "gemini";

/// Google Generative Language API (`generateContent`)
pub struct GeminiProvider {
    client: Client,
    /// Base URL including the API version (e.g. ".../v1beta")
    pub api_base: String,
    pub api_key: Option<String>,
    /// Models tried in order
    pub models: Vec<String>,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Whole-adapter budget, split across models
    timeout: Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(NAME, timeout)?,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            models: config.models.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            timeout,
        })
    }

    async fn generate(&self, key: &str, request: &TranslationRequest, model: &str) -> Result<Translation> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(model)
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(request),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(NAME, &e))?;

        debug!("{} response: {}", model, response.status());

        let response = ensure_success(NAME, response).await?;
        let data: GenerateResponse = read_json(NAME, response).await?;

        let raw = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| Error::invalid_response(NAME, "missing candidates[0].content.parts[0].text"))?;

        translation_from_model_output(NAME, &raw, request.target_language(), model)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: NAME,
            display_name: "Gemini",
            requires_api_key: true,
            level_aware: true,
        }
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<Translation> {
        let key = require_key(NAME, self.api_key.as_deref())?;
        let budget = model_budget(self.timeout, self.models.len());
        try_models(NAME, &self.models, budget, |model| self.generate(key, request, model)).await
    }

    fn is_available(&self) -> bool {
        has_key(self.api_key.as_deref())
    }
}
