use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether the failure happened before the remote side could answer.
    ///
    /// Callers use this to tell "authority unreachable" apart from
    /// "authority said no".
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            BridgeError::NotAvailable(_) | BridgeError::Timeout(_) | BridgeError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
