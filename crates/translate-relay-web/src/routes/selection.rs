use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::helpers::{ResultExt, RouteResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionPayload {
    pub text: Option<Value>,
    pub target_language: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub translation: String,
    pub original_text: String,
    pub target_language: String,
    pub provider: String,
}

/// Quick translation of a highlighted passage through the selection chain.
///
/// Level is irrelevant for the dictionary-style services behind this chain,
/// so the configured default is used.
pub async fn translate_selection(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SelectionPayload>, JsonRejection>,
) -> RouteResult<Json<SelectionResponse>> {
    let Json(payload) = payload.or_bad_request()?;

    let request = state.build_request(
        payload.text.as_ref(),
        None,
        payload.target_language.as_deref(),
    )?;
    let result = state.selection.translate(&request).await?;

    Ok(Json(SelectionResponse {
        translation: result.translated_text,
        original_text: request.text().to_string(),
        target_language: request.target_language().to_string(),
        provider: result.provider_name,
    }))
}
