use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::{Lang, MyMemoryConfig};
use crate::error::{Error, Result};
use crate::request::TranslationRequest;
use super::http::{build_client, ensure_success, read_json, send_error};
use super::plain_translation;
use super::traits::{Provider, ProviderInfo, Translation};

const NAME: &str = "mymemory";
const DISPLAY_NAME: &str = "MyMemory";

/// MyMemory `/get` (keyless)
pub struct MyMemoryProvider {
    client: Client,
    pub enabled: bool,
    pub api_base: String,
    pub email: Option<String>,
    /// Source side of the language pair
    pub source_lang: Lang,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetResponse {
    response_data: Option<ResponseData>,
    /// Number on success, sometimes a string on errors
    response_status: Option<Value>,
    response_details: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: Option<String>,
}

fn status_code(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl MyMemoryProvider {
    pub fn new(config: &MyMemoryConfig, source_lang: Lang, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(NAME, timeout)?,
            enabled: config.enabled,
            api_base: config.api_base.clone(),
            email: config.email.clone().filter(|e| !e.trim().is_empty()),
            source_lang,
        })
    }

    fn request_url(&self, request: &TranslationRequest) -> String {
        let langpair = format!("{}|{}", self.source_lang.code(), request.target_language().code());
        let mut url = format!(
            "{}/get?q={}&langpair={}",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(request.text()),
            urlencoding::encode(&langpair)
        );
        if let Some(email) = &self.email {
            url.push_str("&de=");
            url.push_str(&urlencoding::encode(email));
        }
        url
    }
}

#[async_trait]
impl Provider for MyMemoryProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: NAME,
            display_name: DISPLAY_NAME,
            requires_api_key: false,
            level_aware: false,
        }
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<Translation> {
        if !self.enabled {
            return Err(Error::MissingEndpoint { provider: NAME });
        }

        // MyMemory rejects identical language pairs
        if self.source_lang.code() == request.target_language().code() {
            debug!("{}: source and target are both '{}', returning text as-is", NAME, self.source_lang.code());
            return plain_translation(NAME, DISPLAY_NAME, request.text());
        }

        let response = self
            .client
            .get(self.request_url(request))
            .send()
            .await
            .map_err(|e| send_error(NAME, &e))?;

        let response = ensure_success(NAME, response).await?;
        let data: GetResponse = read_json(NAME, response).await?;

        // HTTP 200 can still carry a quota or language-pair error
        let status = status_code(data.response_status.as_ref());
        if status != Some(200) {
            return Err(Error::invalid_response(
                NAME,
                format!(
                    "responseStatus {}: {}",
                    status.map_or_else(|| "missing".to_string(), |s| s.to_string()),
                    data.response_details.unwrap_or_default()
                ),
            ));
        }

        let text = data
            .response_data
            .and_then(|d| d.translated_text)
            .ok_or_else(|| Error::invalid_response(NAME, "missing responseData.translatedText"))?;

        plain_translation(NAME, DISPLAY_NAME, &text)
    }

    fn is_available(&self) -> bool {
        self.enabled
    }
}
