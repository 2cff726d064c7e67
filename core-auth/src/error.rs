use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Token failed structural validation: {0}")]
    InvalidStructure(String),

    #[error("Token expired at {expired_at} (now {now})")]
    Expired { expired_at: i64, now: i64 },

    #[error("Verification authority unavailable: {0}")]
    ServerUnavailable(String),

    #[error("Verification rejected ({code}): {message}")]
    ServerRejected { code: String, message: String },

    #[error("No authentication token available")]
    NoToken,

    #[error("Access denied: not authenticated")]
    AccessDenied,

    #[error("Session storage unavailable: {0}")]
    Storage(String),

    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl AuthError {
    /// Whether retrying later could succeed without a new token.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AuthError::ServerUnavailable(_) | AuthError::Storage(_) | AuthError::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
