use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{DeepLConfig, Lang};
use crate::error::{Error, Result};
use crate::request::TranslationRequest;
use super::http::{build_client, ensure_success, has_key, read_json, require_key, send_error};
use super::plain_translation;
use super::traits::{Provider, ProviderInfo, Translation};

const NAME: &str = "deepl";
const DISPLAY_NAME: &str = "DeepL";

/// DeepL `/v2/translate`
pub struct DeepLProvider {
    client: Client,
    pub api_base: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: [&'a str; 1],
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

/// DeepL wants upper-case codes and a regional variant for some targets.
fn target_code(lang: &Lang) -> String {
    match lang.code().as_str() {
        "en" => "EN-US".to_string(),
        "pt" => "PT-PT".to_string(),
        other => other.to_uppercase(),
    }
}

impl DeepLProvider {
    pub fn new(config: &DeepLConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(NAME, timeout)?,
            api_base: config.resolved_api_base(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Provider for DeepLProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: NAME,
            display_name: DISPLAY_NAME,
            requires_api_key: true,
            level_aware: false,
        }
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<Translation> {
        let key = require_key(NAME, self.api_key.as_deref())?;
        let url = format!("{}/v2/translate", self.api_base.trim_end_matches('/'));

        let body = TranslateRequest {
            text: [request.text()],
            target_lang: target_code(request.target_language()),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(NAME, &e))?;

        let response = ensure_success(NAME, response).await?;
        let data: TranslateResponse = read_json(NAME, response).await?;

        let first = data
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| Error::invalid_response(NAME, "missing translations[0].text"))?;

        plain_translation(NAME, DISPLAY_NAME, &first.text)
    }

    fn is_available(&self) -> bool {
        has_key(self.api_key.as_deref())
    }
}
