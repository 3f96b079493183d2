//! Plumbing shared by the HTTP-backed adapters.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::util::truncate_for_log;

const MAX_LOGGED_BODY_CHARS: usize = 500;

pub(crate) fn build_client(provider: &'static str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("translate-relay/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::ProviderRequest {
            provider,
            reason: format!("failed to build HTTP client: {e}"),
        })
}

/// The key, or `MissingApiKey` before any network traffic happens.
pub(crate) fn require_key<'a>(provider: &'static str, key: Option<&'a str>) -> Result<&'a str> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(Error::MissingApiKey { provider })
}

pub(crate) fn has_key(key: Option<&str>) -> bool {
    key.is_some_and(|k| !k.trim().is_empty())
}

pub(crate) fn send_error(provider: &'static str, e: &reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::ProviderTimeout { provider }
    } else if e.is_decode() {
        Error::invalid_response(provider, e.to_string())
    } else {
        Error::ProviderRequest {
            provider,
            reason: e.to_string(),
        }
    }
}

/// Turn a non-2xx response into the matching error.
pub(crate) async fn ensure_success(provider: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        return Err(Error::RateLimited {
            provider,
            retry_after,
        });
    }

    let body = response.text().await.unwrap_or_default();
    debug!("{} answered {}: {}", provider, status, truncate_for_log(&body, MAX_LOGGED_BODY_CHARS));
    Err(Error::ProviderStatus {
        provider,
        status: status.as_u16(),
        body: truncate_for_log(&body, MAX_LOGGED_BODY_CHARS),
    })
}

pub(crate) async fn read_json<T: DeserializeOwned>(provider: &'static str, response: Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(|e| send_error(provider, &e))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::invalid_response(provider, e.to_string()))
}
