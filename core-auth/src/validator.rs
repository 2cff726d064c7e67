//! # Claims Validator
//!
//! Local, offline checks on decoded claims: who issued them, who they are
//! for, and whether they are still within their lifetime.

use core_runtime::config::AuthConfig;

use crate::error::{AuthError, Result};
use crate::types::{Claims, Principal};

/// Token type accepted for session use.
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// Validates claims against the configured trust anchors.
#[derive(Debug, Clone)]
pub struct ClaimsValidator {
    trusted_issuer: String,
    trusted_audience: String,
}

impl ClaimsValidator {
    pub fn new(trusted_issuer: impl Into<String>, trusted_audience: impl Into<String>) -> Self {
        Self {
            trusted_issuer: trusted_issuer.into(),
            trusted_audience: trusted_audience.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.trusted_issuer(), config.trusted_audience())
    }

    /// Returns `true` when the claims come from the trusted issuer, target
    /// the trusted audience, are an access token, carry a complete identity
    /// and include a permission set (possibly empty).
    pub fn validate_structure(&self, claims: &Claims) -> bool {
        self.structure_violation(claims).is_none()
    }

    /// `true` when the expiry lies strictly before `now` (unix seconds).
    ///
    /// A token expiring exactly at `now` is still valid.
    pub fn is_expired(claims: &Claims, now: i64) -> bool {
        claims.exp < now
    }

    /// Projects the trusted identity fields out of validated claims.
    pub fn to_principal(claims: &Claims) -> Principal {
        Principal {
            user_id: claims.user_id.clone(),
            username: claims.username.clone(),
            email: claims.email.clone(),
            role: claims.role.clone(),
            permissions: claims.permissions.clone().unwrap_or_default(),
        }
    }

    /// Structure and expiry check with the reason attached.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidStructure`] naming the first failing claim
    /// - [`AuthError::Expired`] when [`Self::is_expired`] holds
    pub fn check(&self, claims: &Claims, now: i64) -> Result<()> {
        if let Some(violation) = self.structure_violation(claims) {
            return Err(AuthError::InvalidStructure(violation.to_string()));
        }
        if Self::is_expired(claims, now) {
            return Err(AuthError::Expired {
                expired_at: claims.exp,
                now,
            });
        }
        Ok(())
    }

    fn structure_violation(&self, claims: &Claims) -> Option<&'static str> {
        if claims.iss != self.trusted_issuer {
            return Some("untrusted issuer");
        }
        if claims.aud != self.trusted_audience {
            return Some("unexpected audience");
        }
        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Some("not an access token");
        }

        let identity = [
            (&claims.user_id, "missing user_id"),
            (&claims.username, "missing username"),
            (&claims.email, "missing email"),
            (&claims.role, "missing role"),
        ];
        if let Some((_, reason)) = identity.iter().find(|(value, _)| value.is_empty()) {
            return Some(*reason);
        }

        if claims.permissions.is_none() {
            return Some("missing permissions");
        }
        None
    }
}
