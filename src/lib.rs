//! Session gate workspace crate.
//!
//! Host applications depend on `session-gate-workspace` and enable the
//! documented features instead of wiring each workspace crate individually.
//!
//! ## Features
//!
//! - `desktop-shims` (default): reqwest HTTP client, in-memory and file
//!   session storage, URL navigation from `bridge-desktop`
//! - `permissive-fallback`: allows local-only acceptance while the
//!   verification authority is unreachable. Never enable in production.

pub use bridge_traits::{
    BridgeError, Clock, HttpClient, HttpMethod, HttpRequest, HttpResponse, NavigationContext,
    RetryPolicy, SessionStorage, SystemClock,
};
pub use core_auth::{
    AuthError, AuthGate, AuthHeaderProvider, AuthSession, Claims, ClaimsValidator, GateDecision,
    Principal, SessionPhase, SessionSnapshot, Token, TrustTier, VerificationCode,
    VerificationOutcome,
};
pub use core_runtime::{logging, AuthConfig, AuthConfigBuilder, AuthEvent, EventBus, EventStream};
pub use core_service::{ServiceError, SessionGateService, SessionGateServiceBuilder};

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub use bridge_desktop::{FileSessionStorage, MemorySessionStorage, ReqwestHttpClient, UrlNavigation};
