//! # Auth Gate
//!
//! The single check protected operations pass through.
//!
//! The gate waits for the session's one-time initialization (it never
//! polls) and then answers [`GateDecision::Allow`] or [`GateDecision::Deny`].
//! A denial is only a value: what to do about it, usually showing the login
//! page, is the host's decision.

use tracing::{debug, instrument};

use crate::error::{AuthError, Result};
use crate::session::AuthSession;

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Deny,
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }
}

/// Guards protected operations behind the session.
#[derive(Debug, Clone)]
pub struct AuthGate {
    session: AuthSession,
}

impl AuthGate {
    pub fn new(session: AuthSession) -> Self {
        Self { session }
    }

    /// Decides whether the caller may proceed.
    ///
    /// Allowed when the session is authenticated once initialization has
    /// settled. An unauthenticated session is still allowed through when
    /// the current navigation carries a token the session has not yet
    /// processed, so a freshly issued credential gets its chance.
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub async fn guard(&self) -> GateDecision {
        self.session.initialize().await;

        if self.session.is_authenticated().await {
            return GateDecision::Allow;
        }

        if self.session.unprocessed_request_token().await.is_some() {
            debug!("Allowing navigation carrying an unprocessed token");
            return GateDecision::Allow;
        }

        debug!("Access denied");
        GateDecision::Deny
    }

    /// [`Self::guard`] for `?` call sites.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AccessDenied`] when the gate denies.
    pub async fn require(&self) -> Result<()> {
        match self.guard().await {
            GateDecision::Allow => Ok(()),
            GateDecision::Deny => Err(AuthError::AccessDenied),
        }
    }
}
