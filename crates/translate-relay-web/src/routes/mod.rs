//! HTTP route handlers for the translation relay.
//!
//! All routes speak JSON. Middleware (tracing, CORS, compression) is layered
//! on in `main`.

mod meta;
mod selection;
mod translate;

pub use meta::{health, list_providers};
pub use selection::translate_selection;
pub use translate::translate;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::helpers::ApiError;
use crate::state::AppState;

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/translate", post(translate))
        .route("/api/translate-selection", post(translate_selection))
        .route("/api/providers", get(list_providers))
        .route("/health", get(health))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .with_state(state)
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not found")
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Mock providers and request helpers shared by the route tests.

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use translate_relay_core::{
        AppConfig, Error, Provider, ProviderInfo, Result, Translation, TranslationOrchestrator,
        TranslationRequest,
    };

    use crate::state::AppState;

    pub struct StubProvider {
        pub name: &'static str,
        pub reply: Option<(&'static str, Option<&'static str>)>,
        pub calls: AtomicUsize,
    }

    impl StubProvider {
        pub fn ok(name: &'static str, text: &'static str, back: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Some((text, back)),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: None,
                calls: AtomicUsize::new(0),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Provider for StubProvider {
        fn info(&self) -> ProviderInfo {
            ProviderInfo {
                name: self.name,
                display_name: self.name,
                requires_api_key: false,
                level_aware: true,
            }
        }

        async fn translate(&self, _request: &TranslationRequest) -> Result<Translation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Some((text, back)) => Ok(Translation {
                    translated: text.to_string(),
                    back_translation: back.map(ToString::to_string),
                    model: format!("{}-model", self.name),
                }),
                None => Err(Error::ProviderStatus {
                    provider: self.name,
                    status: 500,
                    body: "stub failure".to_string(),
                }),
            }
        }
    }

    pub fn app(translate: Vec<Arc<StubProvider>>, selection: Vec<Arc<StubProvider>>) -> Router {
        let chain = |providers: Vec<Arc<StubProvider>>| {
            let providers: Vec<Arc<dyn Provider>> = providers
                .into_iter()
                .map(|p| p as Arc<dyn Provider>)
                .collect();
            TranslationOrchestrator::new(providers, Duration::from_secs(5))
        };
        let state = AppState::with_orchestrators(AppConfig::default(), chain(translate), chain(selection));
        super::router(Arc::new(state))
    }

    pub async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}
