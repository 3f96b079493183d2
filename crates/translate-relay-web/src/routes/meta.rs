use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use translate_relay_core::{known_languages, LanguageOption, TranslationOrchestrator};

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub name: &'static str,
    pub display_name: &'static str,
    pub available: bool,
    pub level_aware: bool,
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub translate: Vec<ProviderStatus>,
    pub selection: Vec<ProviderStatus>,
    /// Target languages with a known name/code mapping
    pub languages: &'static [LanguageOption],
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

fn describe(chain: &TranslationOrchestrator) -> Vec<ProviderStatus> {
    chain
        .providers()
        .iter()
        .map(|p| {
            let info = p.info();
            ProviderStatus {
                name: info.name,
                display_name: info.display_name,
                available: p.is_available(),
                level_aware: info.level_aware,
            }
        })
        .collect()
}

/// List both provider chains in fallback order.
pub async fn list_providers(State(state): State<Arc<AppState>>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        translate: describe(&state.translator),
        selection: describe(&state.selection),
        languages: known_languages(),
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
