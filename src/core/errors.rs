use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnyPayError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("API error: {code} - {message}")]
    ApiError { code: i64, message: String },

    #[error("Unrecognized response: {0}")]
    ProtocolViolation(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Callback server error: {0}")]
    ServerError(String),
}

impl AnyPayError {
    /// Provider-assigned code for `ApiError`, `None` for every other kind
    pub const fn api_code(&self) -> Option<i64> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the failure happened below the provider protocol (network, TLS, body encoding)
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::TransportError(_))
    }
}
