use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Configuration error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),

    #[error("Authentication error: {0}")]
    Auth(#[from] core_auth::AuthError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
