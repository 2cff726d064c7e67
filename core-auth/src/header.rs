//! # Auth Header Provider
//!
//! Supplies `Authorization: Bearer <token>` to outbound calls made on
//! behalf of the signed-in principal.

use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::{AuthError, Result};
use crate::session::AuthSession;
use crate::types::Token;

pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Attaches the session's token to outbound requests.
pub struct AuthHeaderProvider {
    session: AuthSession,
    http_client: Arc<dyn HttpClient>,
}

impl AuthHeaderProvider {
    pub fn new(session: AuthSession, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            session,
            http_client,
        }
    }

    /// Exactly `{"Authorization": "Bearer <token>"}` when the session holds a
    /// token, `None` otherwise.
    pub async fn header(&self) -> Option<HashMap<String, String>> {
        let token = self.session.token().await?;
        Some(Self::bearer_header(&token))
    }

    /// The single-entry header map for `token`.
    pub fn bearer_header(token: &Token) -> HashMap<String, String> {
        HashMap::from([(
            AUTHORIZATION_HEADER.to_string(),
            format!("Bearer {}", token.as_str()),
        )])
    }

    /// Adds the authorization header to `request`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NoToken`] when the session holds no token.
    pub async fn authorize(&self, request: HttpRequest) -> Result<HttpRequest> {
        let header = self.header().await.ok_or(AuthError::NoToken)?;
        Ok(request.headers(header))
    }

    /// Authorizes and executes `request` through the host HTTP client.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NoToken`] when the session holds no token; nothing is sent
    /// - [`AuthError::Http`] when the request never produced a response
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn authenticated_call(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = self.authorize(request).await.map_err(|e| {
            warn!("Refusing unauthenticated call");
            e
        })?;

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| AuthError::Http(e.to_string()))?;

        debug!(status = response.status, "Authenticated call completed");
        Ok(response)
    }
}

impl std::fmt::Debug for AuthHeaderProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHeaderProvider")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
