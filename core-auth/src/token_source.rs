//! # Token Source
//!
//! Locates the candidate token for a session and owns its persistence.
//!
//! A token can come from two places: the single-use query parameter the
//! identity provider redirects back with, or session storage written by an
//! earlier page load. The parameter wins because it is the fresher
//! credential.

use bridge_traits::{NavigationContext, SessionStorage};
use core_runtime::config::AuthConfig;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{AuthError, Result};
use crate::types::{Token, TokenOrigin};

/// Reads and persists the raw token through host bridges.
#[derive(Clone)]
pub struct TokenSource {
    storage: Arc<dyn SessionStorage>,
    navigation: Arc<dyn NavigationContext>,
    storage_key: String,
    token_param: String,
}

impl TokenSource {
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        navigation: Arc<dyn NavigationContext>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            storage,
            navigation,
            storage_key: config.storage_key().to_string(),
            token_param: config.token_param().to_string(),
        }
    }

    /// Token carried by the current navigation, if any. Empty values count
    /// as absent.
    pub fn from_request_parameter(&self) -> Option<Token> {
        self.navigation
            .query_param(&self.token_param)
            .filter(|value| !value.is_empty())
            .map(Token::from)
    }

    /// Token persisted by an earlier session, if any.
    ///
    /// Storage failures are logged and reported as "no token": an
    /// unreadable store must not block the user from signing in again.
    pub async fn from_storage(&self) -> Option<Token> {
        match self.storage.get_item(&self.storage_key).await {
            Ok(value) => value.filter(|v| !v.is_empty()).map(Token::from),
            Err(e) => {
                warn!(key = %self.storage_key, "Failed to read stored token: {}", e);
                None
            }
        }
    }

    /// Request parameter first, then storage.
    pub async fn resolve(&self) -> Option<(Token, TokenOrigin)> {
        if let Some(token) = self.from_request_parameter() {
            debug!(token = %token.masked(), "Token found in request parameter");
            return Some((token, TokenOrigin::RequestParameter));
        }

        let token = self.from_storage().await?;
        debug!(token = %token.masked(), "Token found in session storage");
        Some((token, TokenOrigin::Storage))
    }

    /// Stores `token`, overwriting any previous value.
    pub async fn persist(&self, token: &Token) -> Result<()> {
        self.storage
            .set_item(&self.storage_key, token.as_str())
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        info!(key = %self.storage_key, "Token persisted");
        Ok(())
    }

    /// Removes the stored token. Clearing an empty store succeeds.
    pub async fn clear(&self) -> Result<()> {
        self.storage
            .remove_item(&self.storage_key)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        debug!(key = %self.storage_key, "Stored token cleared");
        Ok(())
    }

    /// Whether storage currently holds a token. Failures read as `false`.
    pub async fn has_stored_token(&self) -> bool {
        self.storage
            .contains(&self.storage_key)
            .await
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSource")
            .field("storage_key", &self.storage_key)
            .field("token_param", &self.token_param)
            .finish()
    }
}
