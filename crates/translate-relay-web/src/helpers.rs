//! Helper types and traits for cleaner route handlers.
//!
//! Every failure leaves the server as a JSON `{ "error": ... }` body, so
//! route handlers can use `?` on core results and extractor rejections.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use translate_relay_core::{Error, ErrorKind};
use tracing::{error, warn};

/// Standard result type for route handlers.
pub type RouteResult<T> = Result<T, ApiError>;

/// A JSON error response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub providers_attempted: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    providers_attempted: Option<&'a [String]>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            providers_attempted: None,
        }
    }
}

/// HTTP status for each user-visible error class.
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::AllProvidersFailed | ErrorKind::Provider => StatusCode::BAD_GATEWAY,
        ErrorKind::Configuration | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = status_for(err.kind());
        if status.is_server_error() {
            error!("Request failed: {}", err);
        } else {
            warn!("Request rejected: {}", err);
        }

        let providers_attempted = match &err {
            Error::AllProvidersFailed { attempted } => Some(attempted.clone()),
            _ => None,
        };

        Self {
            status,
            message: err.public_message(),
            providers_attempted,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            providers_attempted: self.providers_attempted.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Extension trait for converting `Result<T, E>` to `RouteResult<T>`.
pub trait ResultExt<T, E: std::fmt::Display> {
    /// Converts the error to 400 Bad Request.
    fn or_bad_request(self) -> RouteResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn or_bad_request(self) -> RouteResult<T> {
        self.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::AllProvidersFailed), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorKind::Configuration), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_all_failed_keeps_attempted_list() {
        let api: ApiError = Error::AllProvidersFailed {
            attempted: vec!["gemini".to_string()],
        }
        .into();
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
        assert_eq!(api.providers_attempted, Some(vec!["gemini".to_string()]));
        assert_eq!(api.message, "All translation providers failed");
    }
}
