use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::MistralConfig;
use crate::error::{Error, Result};
use crate::request::TranslationRequest;
use super::http::{build_client, ensure_success, has_key, read_json, require_key, send_error};
use super::traits::{Provider, ProviderInfo, Translation};
use super::{build_prompt, model_budget, translation_from_model_output, try_models};

const NAME: &str = "mistral";

/// Mistral chat completions (OpenAI-compatible wire format)
pub struct MistralProvider {
    client: Client,
    /// Base URL for the API (e.g., "https://api.mistral.ai/v1")
    pub api_base: String,
    pub api_key: Option<String>,
    /// Models tried in order
    pub models: Vec<String>,
    pub temperature: f32,
    /// Whole-adapter budget, split across models
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl MistralProvider {
    pub fn new(config: &MistralConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(NAME, timeout)?,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            models: config.models.clone(),
            temperature: config.temperature,
            timeout,
        })
    }

    async fn complete(&self, key: &str, request: &TranslationRequest, model: &str) -> Result<Translation> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));

        let body = ChatRequest {
            model,
            messages: vec![Message {
                role: "user".to_string(),
                content: build_prompt(request),
            }],
            temperature: Some(self.temperature),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(NAME, &e))?;

        debug!("{} response: {}", model, response.status());

        let response = ensure_success(NAME, response).await?;
        let data: ChatResponse = read_json(NAME, response).await?;

        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::invalid_response(NAME, "missing choices[0].message.content"))?;

        translation_from_model_output(NAME, &content, request.target_language(), model)
    }
}

#[async_trait]
impl Provider for MistralProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: NAME,
            display_name: "Mistral",
            requires_api_key: true,
            level_aware: true,
        }
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<Translation> {
        let key = require_key(NAME, self.api_key.as_deref())?;
        let budget = model_budget(self.timeout, self.models.len());
        try_models(NAME, &self.models, budget, |model| self.complete(key, request, model)).await
    }

    fn is_available(&self) -> bool {
        has_key(self.api_key.as_deref())
    }
}
