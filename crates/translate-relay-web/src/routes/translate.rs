use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::helpers::{ResultExt, RouteResult};
use crate::state::AppState;

/// Body of `POST /api/translate`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslatePayload {
    pub text: Option<Value>,
    pub level: Option<String>,
    pub target_language: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_back_translation: Option<String>,
    pub model: String,
    pub provider: String,
    pub target_language: String,
    pub level: String,
}

/// Translate a text at a proficiency level, falling back through providers.
pub async fn translate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslatePayload>, JsonRejection>,
) -> RouteResult<Json<TranslateResponse>> {
    let Json(payload) = payload.or_bad_request()?;

    let request = state.build_request(
        payload.text.as_ref(),
        payload.level.as_deref(),
        payload.target_language.as_deref(),
    )?;

    let result = state.translator.translate(&request).await?;
    info!(
        "Translated {} chars via {} ({})",
        request.text().chars().count(),
        result.provider_name,
        result.model
    );

    Ok(Json(TranslateResponse {
        translated: result.translated_text,
        english_back_translation: result.back_translation,
        model: result.model,
        provider: result.provider_name,
        target_language: request.target_language().to_string(),
        level: request.level().to_string(),
    }))
}
