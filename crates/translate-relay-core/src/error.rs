use thiserror::Error;

/// Unified error type for translate-relay-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Request validation (missing text, unknown proficiency level)
/// - Provider operations (HTTP status, malformed bodies, timeouts, keys)
/// - Orchestration outcomes (every provider failed, nothing configured)
/// - Configuration operations (loading, validation)
/// - General I/O operations
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Input Errors
    // ==========================================================================
    /// The request was rejected before any provider was contacted
    #[error("{0}")]
    InvalidInput(String),

    // ==========================================================================
    // Provider Errors
    // ==========================================================================
    /// Provider needs an API key and none is configured
    #[error("{provider}: API key not configured")]
    MissingApiKey { provider: &'static str },

    /// Provider has no endpoint configured (e.g. self-hosted LibreTranslate)
    #[error("{provider}: endpoint not configured")]
    MissingEndpoint { provider: &'static str },

    /// Provider answered with a non-success HTTP status
    #[error("{provider}: HTTP {status}: {body}")]
    ProviderStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Provider answered 429
    #[error("{provider}: rate limited{}", retry_after.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    RateLimited {
        provider: &'static str,
        retry_after: Option<u64>,
    },

    /// Provider body was not JSON or lacked the expected fields
    #[error("{provider}: invalid response: {reason}")]
    ProviderResponse {
        provider: &'static str,
        reason: String,
    },

    /// Provider call exceeded its time budget
    #[error("{provider}: request timed out")]
    ProviderTimeout { provider: &'static str },

    /// Transport-level failure (DNS, connect, TLS, ...)
    #[error("{provider}: request failed: {reason}")]
    ProviderRequest {
        provider: &'static str,
        reason: String,
    },

    // ==========================================================================
    // Orchestration Errors
    // ==========================================================================
    /// Every provider in the chain was tried and failed
    #[error("translation failed: all providers failed ({})", attempted.join(", "))]
    AllProvidersFailed { attempted: Vec<String> },

    /// The chain is empty or no provider in it is usable
    #[error("no translation providers configured")]
    NoProvidersConfigured,

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used by front ends to pick a status code or exit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request data; no provider was contacted
    InvalidInput,
    /// A single provider failed; only drives fallback
    Provider,
    /// The whole chain was exhausted
    AllProvidersFailed,
    /// Nothing usable is configured, or the configuration is broken
    Configuration,
    /// Local I/O
    Internal,
}

impl Error {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::MissingApiKey { .. }
            | Self::MissingEndpoint { .. }
            | Self::ProviderStatus { .. }
            | Self::RateLimited { .. }
            | Self::ProviderResponse { .. }
            | Self::ProviderTimeout { .. }
            | Self::ProviderRequest { .. } => ErrorKind::Provider,
            Self::AllProvidersFailed { .. } => ErrorKind::AllProvidersFailed,
            Self::NoProvidersConfigured | Self::ConfigLoad(_) | Self::ConfigInvalid { .. } => {
                ErrorKind::Configuration
            }
            Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to show to an end user.
    ///
    /// Provider-level detail (status bodies, URLs) stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::NoProvidersConfigured => "No translation providers configured".to_string(),
            _ => match self.kind() {
                ErrorKind::InvalidInput => self.to_string(),
                ErrorKind::AllProvidersFailed => "All translation providers failed".to_string(),
                ErrorKind::Configuration => "Server configuration error".to_string(),
                ErrorKind::Provider | ErrorKind::Internal => "Translation failed".to_string(),
            },
        }
    }

    pub(crate) fn invalid_response(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::ProviderResponse {
            provider,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
