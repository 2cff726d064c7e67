//! # Authentication Module
//!
//! Token lifecycle and session gating for a client that consumes tokens
//! issued elsewhere.
//!
//! ## Overview
//!
//! The crate never issues or signs credentials. It takes a compact token
//! handed over by an identity provider and decides, for every protected
//! access, whether the bearer is a valid, unexpired, authority-confirmed
//! principal.
//!
//! ## Components
//!
//! - [`TokenSource`] - finds the token (request parameter, then storage) and persists it
//! - [`codec`] - decodes the claims segment
//! - [`ClaimsValidator`] - issuer, audience, type, identity and expiry checks
//! - [`TokenVerifier`] / [`AuthorityVerifier`] - remote confirmation
//! - [`AuthSession`] - the state machine tying them together
//! - [`AuthGate`] - allow/deny for protected operations
//! - [`AuthHeaderProvider`] - `Authorization: Bearer` for outbound calls
//!
//! ## Features
//!
//! - `permissive-fallback`: allows configuring permissive mode, where an
//!   unreachable authority is replaced by local validation and the session
//!   is marked [`TrustTier::LocallyVerified`]. Development builds only.

pub mod codec;
pub mod error;
pub mod gate;
pub mod header;
pub mod session;
pub mod token_source;
pub mod types;
pub mod validator;
pub mod verifier;

#[cfg(test)]
mod test_support;

pub use error::{AuthError, Result};
pub use gate::{AuthGate, GateDecision};
pub use header::{AuthHeaderProvider, AUTHORIZATION_HEADER};
pub use session::{AuthSession, SessionSnapshot};
pub use token_source::TokenSource;
pub use types::{
    Claims, Principal, SessionId, SessionPhase, Token, TokenOrigin, TrustTier, VerificationCode,
    VerificationOutcome,
};
pub use validator::ClaimsValidator;
pub use verifier::{AuthorityVerifier, TokenVerifier};
