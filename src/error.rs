use thiserror::Error;

/// Failure categories surfaced by a flight search.
///
/// Only failures that make the whole search pointless (bad configuration,
/// rejected credentials, an unreachable token endpoint) or that reject the
/// input up front end up here. Per-probe failures are absorbed by the
/// aggregation engine and never become a `SearchError`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Pricing service not configured: {0}")]
    Configuration(String),

    #[error("Pricing service authentication failed: {0}")]
    Auth(String),

    #[error("Pricing service unavailable: {0}")]
    Upstream(String),

    #[error("Invalid search request: {0}")]
    Validation(String),
}

impl SearchError {
    /// Stable machine-readable code for callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "SERVICE_NOT_CONFIGURED",
            Self::Auth(_) => "AUTHENTICATION_FAILED",
            Self::Upstream(_) => "UPSTREAM_UNAVAILABLE",
            Self::Validation(_) => "INVALID_INPUT",
        }
    }

    /// Whether retrying the same request later can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }

    /// Short message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration(_) => "Flight search is not configured on this server.".to_string(),
            Self::Auth(_) => "Flight search authentication failed.".to_string(),
            Self::Upstream(_) => "The flight pricing service is unavailable, try again shortly.".to_string(),
            Self::Validation(msg) => msg.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        let exit_code = match err {
            SearchError::Configuration(_) | SearchError::Validation(_) => 2,
            SearchError::Auth(_) => 3,
            SearchError::Upstream(_) => 4,
        };
        AppError::new(exit_code, format!("[{}] {}", err.code(), err.user_message()))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
