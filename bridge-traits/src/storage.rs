//! Session Storage Abstraction
//!
//! Durable, session-scoped key/value storage for the raw credential.
//!
//! The stored value is the token exactly as received. Encryption at rest is
//! the host's business, not the core's.

use async_trait::async_trait;

use crate::error::Result;

/// Session-scoped string storage
///
/// Abstracts per-session storage:
/// - Web: `sessionStorage`
/// - Desktop: in-memory map or a file under the app data directory
/// - Mobile: app-private preferences cleared on sign-out
///
/// # Security Requirements
///
/// Implementations MUST:
/// - Scope values to the current application session
/// - Never log stored values
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SessionStorage;
///
/// async fn remember(storage: &dyn SessionStorage, token: &str) -> Result<()> {
///     storage.set_item("jwt_token", token).await
/// }
/// ```
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Read a value
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, overwriting any previous value for the key
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<()>;

    /// Check if a key exists without returning its value
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get_item(key).await?.is_some())
    }
}
