//! # Remote Verifier
//!
//! Asks the verification authority whether a token is genuine.
//!
//! ## Protocol
//!
//! ```text
//! POST {authority_base_url}{verify_path}
//! Content-Type: application/json
//!
//! { "token": "<token>" }
//! ```
//!
//! The authority answers with
//! `{ authenticated, user?, message?, error?, code? }`. Every possible
//! result, including transport failures, becomes a [`VerificationOutcome`];
//! the verifier itself never fails.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use core_runtime::config::AuthConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::types::{Principal, Token, VerificationCode, VerificationOutcome};

/// Remote token verification.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token`. Never fails: problems are reported in the outcome.
    async fn verify(&self, token: &Token) -> VerificationOutcome;
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    authenticated: bool,
    #[serde(default)]
    user: Option<Principal>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// [`TokenVerifier`] backed by the HTTP verification endpoint.
pub struct AuthorityVerifier {
    http_client: Arc<dyn HttpClient>,
    verify_url: String,
    timeout: Duration,
}

impl AuthorityVerifier {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &AuthConfig) -> Self {
        Self {
            http_client,
            verify_url: config.verify_url(),
            timeout: config.verification_timeout(),
        }
    }

    pub fn verify_url(&self) -> &str {
        &self.verify_url
    }

    fn build_request(&self, token: &Token) -> Option<HttpRequest> {
        match HttpRequest::new(HttpMethod::Post, &self.verify_url)
            .json(&VerifyRequest {
                token: token.as_str(),
            }) {
            Ok(request) => Some(request.timeout(self.timeout)),
            Err(e) => {
                warn!("Failed to encode verification request: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl TokenVerifier for AuthorityVerifier {
    #[instrument(skip(self, token), fields(url = %self.verify_url, token = %token.masked()))]
    async fn verify(&self, token: &Token) -> VerificationOutcome {
        let Some(request) = self.build_request(token) else {
            return VerificationOutcome::failed(VerificationCode::Unknown)
                .with_message("verification request could not be encoded");
        };

        debug!("Sending verification request");
        let response = match timeout(self.timeout, self.http_client.execute(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(transport = e.is_transport(), "Verification authority unreachable: {}", e);
                return VerificationOutcome::failed(VerificationCode::ServerUnavailable)
                    .with_message(e.to_string());
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Verification timed out");
                return VerificationOutcome::failed(VerificationCode::ServerUnavailable)
                    .with_message(format!(
                        "verification timed out after {}ms",
                        self.timeout.as_millis()
                    ));
            }
        };

        let body: VerifyResponse = match response.json() {
            Ok(body) => body,
            Err(e) => {
                warn!(status = response.status, "Unreadable verification response: {}", e);
                return VerificationOutcome::failed(VerificationCode::Unknown)
                    .with_message(e.to_string());
            }
        };

        let message = body.message.or(body.error);

        if response.is_success() && body.authenticated {
            if let Some(user) = body.user {
                info!(user_id = %user.user_id, "Token verified by authority");
                return VerificationOutcome::verified(user);
            }
        }

        let code = body
            .code
            .as_deref()
            .map(VerificationCode::from_authority)
            .unwrap_or(VerificationCode::Rejected);

        warn!(
            status = response.status,
            code = %code,
            authority_code = ?body.code,
            "Token rejected by authority"
        );

        let mut outcome = VerificationOutcome::failed(code)
            .with_message(message.unwrap_or_else(|| "Token verification failed".to_string()));
        if let Some(raw) = body.code {
            outcome = outcome.with_authority_code(raw);
        }
        outcome
    }
}
