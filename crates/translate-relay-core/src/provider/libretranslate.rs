use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LibreTranslateConfig;
use crate::error::{Error, Result};
use crate::request::TranslationRequest;
use super::http::{build_client, ensure_success, read_json, send_error};
use super::plain_translation;
use super::traits::{Provider, ProviderInfo, Translation};

const NAME: &str = "libretranslate";
const DISPLAY_NAME: &str = "LibreTranslate";

/// LibreTranslate `/translate`, public or self-hosted
pub struct LibreTranslateProvider {
    client: Client,
    pub api_base: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: String,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: Option<String>,
    error: Option<String>,
}

impl LibreTranslateProvider {
    pub fn new(config: &LibreTranslateConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(NAME, timeout)?,
            api_base: config.api_base.clone().filter(|b| !b.trim().is_empty()),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }
}

#[async_trait]
impl Provider for LibreTranslateProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: NAME,
            display_name: DISPLAY_NAME,
            requires_api_key: false,
            level_aware: false,
        }
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<Translation> {
        let base = self
            .api_base
            .as_deref()
            .ok_or(Error::MissingEndpoint { provider: NAME })?;
        let url = format!("{}/translate", base.trim_end_matches('/'));

        let body = TranslateRequest {
            q: request.text(),
            source: "auto",
            target: request.target_language().code(),
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(NAME, &e))?;

        let response = ensure_success(NAME, response).await?;
        let data: TranslateResponse = read_json(NAME, response).await?;

        match (data.translated_text, data.error) {
            (Some(text), _) => plain_translation(NAME, DISPLAY_NAME, &text),
            (None, Some(error)) => Err(Error::invalid_response(NAME, error)),
            (None, None) => Err(Error::invalid_response(NAME, "missing translatedText")),
        }
    }

    fn is_available(&self) -> bool {
        self.api_base.is_some()
    }
}
