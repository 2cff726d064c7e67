//! # Authentication Session
//!
//! Owns the token lifecycle for one application session.
//!
//! ## Overview
//!
//! [`AuthSession`] moves through
//! `Uninitialized → Initializing → Authenticated(tier) | Unauthenticated`.
//! Either settled state can drop back to `Unauthenticated` on logout or a
//! failed refresh, and `Authenticated` re-enters itself when a refresh
//! succeeds.
//!
//! The session is a cheap `Clone` handle. Build it once in the composition
//! root and hand clones to whoever needs it.
//!
//! ## Initialization
//!
//! [`AuthSession::initialize`] runs at most once per session. Concurrent
//! callers share the same in-flight run, and a caller that gives up waiting
//! does not cancel it: the protocol runs on its own task and its result is
//! cached for everyone who asks later.
//!
//! ## Usage
//!
//! ```ignore
//! let session = AuthSession::new(config, source, verifier, clock, event_bus);
//!
//! if session.initialize().await {
//!     let principal = session.principal().await;
//! }
//! ```

use bridge_traits::time::Clock;
use chrono::{DateTime, Utc};
use core_runtime::config::AuthConfig;
use core_runtime::events::{AuthEvent, EventBus};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::codec;
use crate::error::{AuthError, Result};
use crate::token_source::TokenSource;
use crate::types::{
    Principal, SessionId, SessionPhase, Token, TokenOrigin, TrustTier, VerificationCode,
};
use crate::validator::ClaimsValidator;
use crate::verifier::TokenVerifier;

type InitFuture = Shared<BoxFuture<'static, bool>>;

/// Token and principal, always held together.
#[derive(Debug, Clone)]
struct Credential {
    token: Token,
    principal: Principal,
    tier: TrustTier,
    verified_at: DateTime<Utc>,
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    credential: Option<Credential>,
    initialized: bool,
    /// Request-parameter token already considered by initialization.
    processed_request_token: Option<Token>,
}

struct SessionInner {
    id: SessionId,
    config: AuthConfig,
    source: TokenSource,
    validator: ClaimsValidator,
    verifier: Arc<dyn TokenVerifier>,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    state: RwLock<SessionState>,
    init: Mutex<Option<InitFuture>>,
}

/// Read-only diagnostic view of a session.
///
/// Safe to log: the token only appears as a masked prefix.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub phase: SessionPhase,
    pub initialized: bool,
    pub has_token: bool,
    pub token_preview: Option<String>,
    pub token_length: Option<usize>,
    pub principal: Option<Principal>,
    pub trust_tier: Option<TrustTier>,
    pub last_verified_at: Option<DateTime<Utc>>,
    pub request_token_present: bool,
    pub stored_token_present: bool,
}

/// Shared handle to the authentication session.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

impl AuthSession {
    /// Creates a session in the `Uninitialized` phase.
    ///
    /// # Arguments
    ///
    /// * `config` - Trust anchors and permissive-mode setting
    /// * `source` - Where tokens are read from and persisted to
    /// * `verifier` - Remote verification of candidate tokens
    /// * `clock` - Time source for expiry checks
    /// * `event_bus` - Receives lifecycle events
    pub fn new(
        config: AuthConfig,
        source: TokenSource,
        verifier: Arc<dyn TokenVerifier>,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
    ) -> Self {
        let validator = ClaimsValidator::from_config(&config);
        Self {
            inner: Arc::new(SessionInner {
                id: SessionId::new(),
                config,
                source,
                validator,
                verifier,
                clock,
                event_bus,
                state: RwLock::new(SessionState {
                    phase: SessionPhase::Uninitialized,
                    credential: None,
                    initialized: false,
                    processed_request_token: None,
                }),
                init: Mutex::new(None),
            }),
        }
    }

    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    pub fn config(&self) -> &AuthConfig {
        &self.inner.config
    }

    /// Establishes the session from the available token, once.
    ///
    /// Every caller, concurrent or later, waits on the same single run and
    /// then gets the current authentication state, so a call after logout
    /// reports `false`.
    ///
    /// Failures never surface as errors: a malformed, invalid, expired or
    /// rejected token leaves the session `Unauthenticated` with storage
    /// cleared.
    pub async fn initialize(&self) -> bool {
        let run = {
            let mut slot = self.inner.init.lock().await;
            slot.get_or_insert_with(|| self.spawn_initialization()).clone()
        };
        run.await;
        self.is_authenticated().await
    }

    fn spawn_initialization(&self) -> InitFuture {
        let session = self.clone();
        let session_id = self.inner.id;
        let handle = tokio::spawn(async move { session.run_initialization().await });

        async move {
            match handle.await {
                Ok(authenticated) => authenticated,
                Err(e) => {
                    error!(session_id = %session_id, "Session initialization task failed: {}", e);
                    false
                }
            }
        }
        .boxed()
        .shared()
    }

    #[instrument(skip(self), fields(session_id = %self.inner.id))]
    async fn run_initialization(&self) -> bool {
        info!("Initializing session");
        self.inner.state.write().await.phase = SessionPhase::Initializing;
        let _ = self.inner.event_bus.emit(AuthEvent::Initializing {
            session_id: self.inner.id.to_string(),
        });

        match self.establish().await {
            Ok(credential) => {
                let user_id = credential.principal.user_id.clone();
                let tier = credential.tier;
                {
                    let mut state = self.inner.state.write().await;
                    state.phase = SessionPhase::Authenticated(tier);
                    state.credential = Some(credential);
                    state.initialized = true;
                }
                info!(user_id = %user_id, tier = %tier, "Session authenticated");
                let _ = self.inner.event_bus.emit(AuthEvent::SignedIn {
                    session_id: self.inner.id.to_string(),
                    user_id,
                    tier: tier.to_string(),
                });
                true
            }
            Err(AuthError::NoToken) => {
                debug!("No token available");
                self.settle_unauthenticated().await;
                false
            }
            Err(err) => {
                warn!("Session not authenticated: {}", err);
                if let Err(e) = self.inner.source.clear().await {
                    warn!("Failed to clear rejected token: {}", e);
                }
                self.settle_unauthenticated().await;
                let _ = self.inner.event_bus.emit(AuthEvent::AuthError {
                    session_id: Some(self.inner.id.to_string()),
                    message: err.to_string(),
                    recoverable: err.is_recoverable(),
                });
                false
            }
        }
    }

    async fn settle_unauthenticated(&self) {
        let mut state = self.inner.state.write().await;
        state.phase = SessionPhase::Unauthenticated;
        state.credential = None;
        state.initialized = true;
    }

    /// Resolve, decode, validate and verify a token.
    async fn establish(&self) -> Result<Credential> {
        let (token, origin) = self.inner.source.resolve().await.ok_or(AuthError::NoToken)?;

        if origin == TokenOrigin::RequestParameter {
            self.inner.state.write().await.processed_request_token = Some(token.clone());
        }

        let claims = codec::decode(&token)?;
        self.inner
            .validator
            .check(&claims, self.inner.clock.unix_timestamp())?;

        let outcome = self.inner.verifier.verify(&token).await;

        let (principal, tier) = if let Some(principal) = outcome.accepted_principal() {
            (principal.clone(), TrustTier::ServerVerified)
        } else if outcome.is_server_unavailable() && self.inner.config.permissive_mode() {
            warn!("Authority unavailable, accepting locally validated token");
            // Time has passed while waiting on the authority.
            self.inner
                .validator
                .check(&claims, self.inner.clock.unix_timestamp())?;
            (ClaimsValidator::to_principal(&claims), TrustTier::LocallyVerified)
        } else {
            let message = outcome
                .message
                .clone()
                .unwrap_or_else(|| "Token verification failed".to_string());
            return Err(match outcome.code {
                Some(VerificationCode::ServerUnavailable) => AuthError::ServerUnavailable(message),
                code => AuthError::ServerRejected {
                    code: outcome
                        .authority_code
                        .clone()
                        .or_else(|| code.map(|c| c.to_string()))
                        .unwrap_or_else(|| VerificationCode::Rejected.to_string()),
                    message,
                },
            });
        };

        if let Err(e) = self.inner.source.persist(&token).await {
            warn!("Authenticated but token could not be persisted: {}", e);
        }

        Ok(Credential {
            token,
            principal,
            tier,
            verified_at: self.inner.clock.now(),
        })
    }

    /// Re-verifies the current token with the authority.
    ///
    /// Returns `false` without side effects when there is no token. A failed
    /// verification logs the session out.
    #[instrument(skip(self), fields(session_id = %self.inner.id))]
    pub async fn refresh_verification(&self) -> bool {
        let Some(token) = self.token().await else {
            debug!("No token to refresh");
            return false;
        };

        let outcome = self.inner.verifier.verify(&token).await;
        let Some(principal) = outcome.accepted_principal().cloned() else {
            warn!(code = ?outcome.code, "Re-verification failed, logging out");
            self.sign_out("verification failed").await;
            return false;
        };

        let user_id = principal.user_id.clone();
        {
            let mut state = self.inner.state.write().await;
            match state.credential.as_mut() {
                Some(credential) if credential.token == token => {
                    credential.principal = principal;
                    credential.tier = TrustTier::ServerVerified;
                    credential.verified_at = self.inner.clock.now();
                    state.phase = SessionPhase::Authenticated(TrustTier::ServerVerified);
                }
                _ => {
                    debug!("Session changed during refresh, discarding result");
                    return false;
                }
            }
        }

        info!(user_id = %user_id, "Verification refreshed");
        let _ = self.inner.event_bus.emit(AuthEvent::VerificationRefreshed {
            session_id: self.inner.id.to_string(),
            user_id,
        });
        true
    }

    /// Drops the credential and asks the host to show the login page.
    ///
    /// Emits `SignedOut`, then `RedirectRequested` carrying the configured
    /// login redirect URL, if any. The session never navigates by itself.
    #[instrument(skip(self), fields(session_id = %self.inner.id))]
    pub async fn logout(&self) {
        self.sign_out("logout").await;
    }

    async fn sign_out(&self, reason: &str) {
        if let Err(e) = self.inner.source.clear().await {
            warn!("Failed to clear stored token: {}", e);
        }

        {
            let mut state = self.inner.state.write().await;
            state.credential = None;
            state.phase = SessionPhase::Unauthenticated;
        }

        info!(reason, "Signed out");
        let _ = self.inner.event_bus.emit(AuthEvent::SignedOut {
            session_id: self.inner.id.to_string(),
            reason: reason.to_string(),
        });

        let _ = self.inner.event_bus.emit(AuthEvent::RedirectRequested {
            url: self
                .inner
                .config
                .login_redirect_url()
                .map(str::to_string),
        });
    }

    /// The request-parameter token on the current navigation, unless
    /// initialization has already considered it.
    pub async fn unprocessed_request_token(&self) -> Option<Token> {
        let token = self.inner.source.from_request_parameter()?;
        let state = self.inner.state.read().await;
        match &state.processed_request_token {
            Some(processed) if *processed == token => None,
            _ => Some(token),
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.state.read().await.credential.is_some()
    }

    pub async fn is_initialized(&self) -> bool {
        self.inner.state.read().await.initialized
    }

    pub async fn phase(&self) -> SessionPhase {
        self.inner.state.read().await.phase
    }

    pub async fn token(&self) -> Option<Token> {
        self.read_credential(|c| c.token.clone()).await
    }

    pub async fn principal(&self) -> Option<Principal> {
        self.read_credential(|c| c.principal.clone()).await
    }

    pub async fn trust_tier(&self) -> Option<TrustTier> {
        self.read_credential(|c| c.tier).await
    }

    pub async fn last_verified_at(&self) -> Option<DateTime<Utc>> {
        self.read_credential(|c| c.verified_at).await
    }

    pub async fn user_id(&self) -> Option<String> {
        self.read_credential(|c| c.principal.user_id.clone()).await
    }

    pub async fn username(&self) -> Option<String> {
        self.read_credential(|c| c.principal.username.clone()).await
    }

    pub async fn email(&self) -> Option<String> {
        self.read_credential(|c| c.principal.email.clone()).await
    }

    pub async fn role(&self) -> Option<String> {
        self.read_credential(|c| c.principal.role.clone()).await
    }

    /// Permissions of the current principal; empty when unauthenticated.
    pub async fn permissions(&self) -> BTreeSet<String> {
        self.read_credential(|c| c.principal.permissions.clone())
            .await
            .unwrap_or_default()
    }

    pub async fn has_permission(&self, permission: &str) -> bool {
        self.read_credential(|c| c.principal.has_permission(permission))
            .await
            .unwrap_or(false)
    }

    pub async fn has_role(&self, role: &str) -> bool {
        self.read_credential(|c| c.principal.has_role(role))
            .await
            .unwrap_or(false)
    }

    /// Diagnostic view of the session. Does not initialize it.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let request_token_present = self.inner.source.from_request_parameter().is_some();
        let stored_token_present = self.inner.source.has_stored_token().await;

        let state = self.inner.state.read().await;
        let credential = state.credential.as_ref();
        SessionSnapshot {
            session_id: self.inner.id,
            phase: state.phase,
            initialized: state.initialized,
            has_token: credential.is_some(),
            token_preview: credential.map(|c| c.token.masked()),
            token_length: credential.map(|c| c.token.len()),
            principal: credential.map(|c| c.principal.clone()),
            trust_tier: credential.map(|c| c.tier),
            last_verified_at: credential.map(|c| c.verified_at),
            request_token_present,
            stored_token_present,
        }
    }

    async fn read_credential<T>(&self, f: impl FnOnce(&Credential) -> T) -> Option<T> {
        self.inner.state.read().await.credential.as_ref().map(f)
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("id", &self.inner.id)
            .field("source", &self.inner.source)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::types::VerificationOutcome;
    use core_runtime::events::Receiver;
    use std::time::Duration;

    struct Harness {
        session: AuthSession,
        storage: Arc<MemoryStorage>,
        navigation: Arc<StaticNavigation>,
        verifier: Arc<FakeVerifier>,
        events: Receiver<AuthEvent>,
    }

    fn harness(
        config: AuthConfig,
        storage: MemoryStorage,
        param: Option<&str>,
        verifier: FakeVerifier,
    ) -> Harness {
        let storage = Arc::new(storage);
        let navigation = Arc::new(StaticNavigation::new("token", param));
        let verifier = Arc::new(verifier);
        let event_bus = EventBus::new(32);
        let events = event_bus.subscribe();
        let source = TokenSource::new(storage.clone(), navigation.clone(), &config);
        let session = AuthSession::new(
            config,
            source,
            verifier.clone(),
            Arc::new(FixedClock(NOW)),
            event_bus,
        );
        Harness {
            session,
            storage,
            navigation,
            verifier,
            events,
        }
    }

    fn stored(token: &Token) -> MemoryStorage {
        MemoryStorage::with("jwt_token", token.as_str())
    }

    fn drain(events: &mut Receiver<AuthEvent>) -> Vec<AuthEvent> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn test_no_token_is_unauthenticated() {
        let h = harness(
            test_config(),
            MemoryStorage::default(),
            None,
            FakeVerifier::returning(VerificationOutcome::verified(bob())),
        );

        assert!(!h.session.initialize().await);
        assert_eq!(h.session.phase().await, SessionPhase::Unauthenticated);
        assert!(h.session.is_initialized().await);
        assert_eq!(h.verifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_server_verified_session() {
        let token = valid_token();
        let h = harness(
            test_config(),
            MemoryStorage::default(),
            Some(token.as_str()),
            FakeVerifier::returning(VerificationOutcome::verified(bob())),
        );

        assert!(h.session.initialize().await);
        assert_eq!(
            h.session.phase().await,
            SessionPhase::Authenticated(TrustTier::ServerVerified)
        );
        assert_eq!(h.session.token().await, Some(token.clone()));
        assert_eq!(h.storage.value("jwt_token"), Some(token.into_inner()));
        assert_eq!(h.session.username().await.as_deref(), Some("bob"));
        assert!(h.session.has_permission("gen").await);
        assert!(!h.session.has_permission("admin").await);
        assert!(h.session.has_role("user").await);
        assert!(h.session.last_verified_at().await.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_initialize_verifies_once() {
        let h = harness(
            test_config(),
            stored(&valid_token()),
            None,
            FakeVerifier::returning(VerificationOutcome::verified(bob()))
                .with_delay(Duration::from_millis(50)),
        );

        let (first, second) = tokio::join!(h.session.initialize(), h.session.initialize());

        assert!(first);
        assert!(second);
        assert_eq!(h.verifier.calls(), 1);

        // Later callers get the cached result.
        assert!(h.session.initialize().await);
        assert_eq!(h.verifier.calls(), 1);
    }

    #[tokio::test]
    async fn test_abandoned_initialize_still_completes() {
        let h = harness(
            test_config(),
            stored(&valid_token()),
            None,
            FakeVerifier::returning(VerificationOutcome::verified(bob()))
                .with_delay(Duration::from_millis(100)),
        );

        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), h.session.initialize()).await;
        assert!(abandoned.is_err());

        assert!(h.session.initialize().await);
        assert_eq!(h.verifier.calls(), 1);
    }

    #[tokio::test]
    async fn test_rejected_token_clears_storage() {
        let token = valid_token();
        let mut h = harness(
            test_config(),
            stored(&token),
            None,
            FakeVerifier::returning(
                VerificationOutcome::failed(VerificationCode::Rejected).with_message("revoked"),
            ),
        );

        assert!(!h.session.initialize().await);
        assert!(!h.session.is_authenticated().await);
        assert_eq!(h.storage.value("jwt_token"), None);

        let events = drain(&mut h.events);
        assert!(events.iter().any(|e| matches!(
            e,
            AuthEvent::AuthError { recoverable: false, .. }
        )));
    }

    #[tokio::test]
    async fn test_malformed_token_never_reaches_verifier() {
        let h = harness(
            test_config(),
            MemoryStorage::with("jwt_token", "not-a-token"),
            None,
            FakeVerifier::returning(VerificationOutcome::verified(bob())),
        );

        assert!(!h.session.initialize().await);
        assert_eq!(h.verifier.calls(), 0);
        assert_eq!(h.storage.value("jwt_token"), None);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected_locally() {
        let mut claims = claims_json();
        claims["exp"] = (NOW - 1).into();
        let h = harness(
            test_config(),
            stored(&make_token(&claims)),
            None,
            FakeVerifier::returning(VerificationOutcome::verified(bob())),
        );

        assert!(!h.session.initialize().await);
        assert_eq!(h.verifier.calls(), 0);
        assert_eq!(h.storage.value("jwt_token"), None);
    }

    #[tokio::test]
    async fn test_token_expiring_now_is_accepted() {
        let mut claims = claims_json();
        claims["exp"] = NOW.into();
        let h = harness(
            test_config(),
            stored(&make_token(&claims)),
            None,
            FakeVerifier::returning(VerificationOutcome::verified(bob())),
        );

        assert!(h.session.initialize().await);
    }

    #[tokio::test]
    async fn test_server_unavailable_without_permissive_mode() {
        let h = harness(
            test_config(),
            stored(&valid_token()),
            None,
            FakeVerifier::returning(VerificationOutcome::failed(
                VerificationCode::ServerUnavailable,
            )),
        );

        assert!(!h.session.initialize().await);
        assert_eq!(h.storage.value("jwt_token"), None);
    }

    #[tokio::test]
    async fn test_permissive_mode_falls_back_to_local_validation() {
        let token = valid_token();
        let h = harness(
            permissive_config(),
            MemoryStorage::default(),
            Some(token.as_str()),
            FakeVerifier::returning(VerificationOutcome::failed(
                VerificationCode::ServerUnavailable,
            )),
        );

        assert!(h.session.initialize().await);
        assert_eq!(
            h.session.phase().await,
            SessionPhase::Authenticated(TrustTier::LocallyVerified)
        );
        assert_eq!(h.session.trust_tier().await, Some(TrustTier::LocallyVerified));
        assert_eq!(h.session.principal().await, Some(bob()));
        assert_eq!(h.storage.value("jwt_token"), Some(token.into_inner()));
    }

    #[tokio::test]
    async fn test_permissive_mode_does_not_override_rejection() {
        let h = harness(
            permissive_config(),
            stored(&valid_token()),
            None,
            FakeVerifier::returning(VerificationOutcome::failed(VerificationCode::Rejected)),
        );

        assert!(!h.session.initialize().await);
    }

    #[tokio::test]
    async fn test_refresh_updates_principal() {
        let mut promoted = bob();
        promoted.role = "admin".to_string();
        let h = harness(
            test_config(),
            stored(&valid_token()),
            None,
            FakeVerifier::sequence(vec![
                VerificationOutcome::verified(bob()),
                VerificationOutcome::verified(promoted),
            ]),
        );

        assert!(h.session.initialize().await);
        assert!(h.session.refresh_verification().await);
        assert!(h.session.has_role("admin").await);
        assert_eq!(h.verifier.calls(), 2);
    }

    #[tokio::test]
    async fn test_refresh_without_token_is_noop() {
        let h = harness(
            test_config(),
            MemoryStorage::default(),
            None,
            FakeVerifier::returning(VerificationOutcome::verified(bob())),
        );

        assert!(!h.session.refresh_verification().await);
        assert_eq!(h.verifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_logs_out() {
        let mut h = harness(
            test_config(),
            stored(&valid_token()),
            None,
            FakeVerifier::sequence(vec![
                VerificationOutcome::verified(bob()),
                VerificationOutcome::failed(VerificationCode::Rejected),
            ]),
        );

        assert!(h.session.initialize().await);
        assert!(!h.session.refresh_verification().await);
        assert!(!h.session.is_authenticated().await);
        assert_eq!(h.storage.value("jwt_token"), None);

        let events = drain(&mut h.events);
        assert!(events
            .iter()
            .any(|e| matches!(e, AuthEvent::SignedOut { reason, .. } if reason == "verification failed")));
    }

    #[tokio::test]
    async fn test_logout_clears_state_and_requests_redirect() {
        let mut h = harness(
            test_config(),
            stored(&valid_token()),
            None,
            FakeVerifier::returning(VerificationOutcome::verified(bob())),
        );
        assert!(h.session.initialize().await);
        drain(&mut h.events);

        h.session.logout().await;

        assert!(!h.session.is_authenticated().await);
        assert_eq!(h.session.token().await, None);
        assert_eq!(h.session.principal().await, None);
        assert!(h.session.permissions().await.is_empty());
        assert_eq!(h.storage.value("jwt_token"), None);

        let events = drain(&mut h.events);
        assert!(matches!(events[0], AuthEvent::SignedOut { .. }));
        assert_eq!(
            events[1],
            AuthEvent::RedirectRequested {
                url: Some("https://example.com/login".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_initialize_after_logout_reports_current_state() {
        let h = harness(
            test_config(),
            stored(&valid_token()),
            None,
            FakeVerifier::returning(VerificationOutcome::verified(bob())),
        );

        assert!(h.session.initialize().await);
        h.session.logout().await;

        assert!(!h.session.initialize().await);
        assert!(!h.session.is_authenticated().await);
        assert_eq!(h.verifier.calls(), 1);
    }

    #[tokio::test]
    async fn test_initialize_after_failed_refresh_reports_current_state() {
        let h = harness(
            test_config(),
            stored(&valid_token()),
            None,
            FakeVerifier::sequence(vec![
                VerificationOutcome::verified(bob()),
                VerificationOutcome::failed(VerificationCode::Rejected),
            ]),
        );

        assert!(h.session.initialize().await);
        assert!(!h.session.refresh_verification().await);
        assert!(!h.session.initialize().await);
    }

    #[tokio::test]
    async fn test_logout_without_redirect_url_still_requests_redirect() {
        let mut h = harness(
            permissive_config(),
            stored(&valid_token()),
            None,
            FakeVerifier::returning(VerificationOutcome::verified(bob())),
        );
        assert_eq!(h.session.config().login_redirect_url(), None);
        assert!(h.session.initialize().await);
        drain(&mut h.events);

        h.session.logout().await;

        let events = drain(&mut h.events);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], AuthEvent::SignedOut { .. }));
        assert_eq!(events[1], AuthEvent::RedirectRequested { url: None });
    }

    #[tokio::test]
    async fn test_request_token_marked_processed() {
        let token = valid_token();
        let h = harness(
            test_config(),
            MemoryStorage::default(),
            Some(token.as_str()),
            FakeVerifier::returning(VerificationOutcome::failed(VerificationCode::Rejected)),
        );

        assert_eq!(h.session.unprocessed_request_token().await, Some(token));
        assert!(!h.session.initialize().await);
        assert_eq!(h.session.unprocessed_request_token().await, None);

        h.navigation.set(Some("another.fresh.token"));
        assert!(h.session.unprocessed_request_token().await.is_some());
    }

    #[tokio::test]
    async fn test_snapshot_masks_token() {
        let token = valid_token();
        let h = harness(
            test_config(),
            stored(&token),
            None,
            FakeVerifier::returning(VerificationOutcome::verified(bob())),
        );

        let before = h.session.snapshot().await;
        assert_eq!(before.phase, SessionPhase::Uninitialized);
        assert!(!before.has_token);
        assert!(before.stored_token_present);

        h.session.initialize().await;
        let after = h.session.snapshot().await;
        assert!(after.has_token);
        assert_eq!(after.token_length, Some(token.len()));
        assert_eq!(after.trust_tier, Some(TrustTier::ServerVerified));

        let rendered = serde_json::to_string(&after).unwrap();
        assert!(!rendered.contains(token.as_str()));
    }
}
