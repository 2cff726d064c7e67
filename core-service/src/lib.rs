//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, session
//! storage, navigation, clock) and an [`AuthConfig`] into one
//! [`SessionGateService`]. Every component shares the same
//! [`AuthSession`], so there is exactly one session per service.
//!
//! Desktop apps typically enable the `desktop-shims` feature (which depends
//! on `bridge-desktop`) and only supply what differs from the defaults.
//! Other hosts must inject every bridge; a missing one fails the build with
//! [`ServiceError::CapabilityMissing`].
//!
//! ```ignore
//! use core_service::SessionGateService;
//!
//! let service = SessionGateService::builder(config)
//!     .navigation(Arc::new(UrlNavigation::parse(launch_url)?))
//!     .build()?;
//!
//! if service.gate().guard().await.is_allowed() {
//!     let header = service.header_provider().header().await;
//! }
//! ```

pub mod error;

pub use error::{Result, ServiceError};

use std::sync::Arc;

use bridge_traits::{Clock, HttpClient, NavigationContext, SessionStorage, SystemClock};
use core_auth::{AuthGate, AuthHeaderProvider, AuthSession, AuthorityVerifier, TokenSource, TokenVerifier};
use core_runtime::{AuthConfig, EventBus, EventStream};
use tracing::info;

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
use bridge_desktop::{MemorySessionStorage, ReqwestHttpClient, UrlNavigation};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct SessionGateService {
    config: AuthConfig,
    session: AuthSession,
    gate: AuthGate,
    header_provider: Arc<AuthHeaderProvider>,
    event_bus: EventBus,
}

impl SessionGateService {
    /// Start building a service for `config`.
    pub fn builder(config: AuthConfig) -> SessionGateServiceBuilder {
        SessionGateServiceBuilder::new(config)
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    pub fn header_provider(&self) -> &AuthHeaderProvider {
        &self.header_provider
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Stream of lifecycle events emitted from now on.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    /// Runs session initialization; see [`AuthSession::initialize`].
    pub async fn start(&self) -> bool {
        self.session.initialize().await
    }
}

impl std::fmt::Debug for SessionGateService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGateService")
            .field("session", &self.session)
            .field("verify_url", &self.config.verify_url())
            .finish()
    }
}

/// Builder for [`SessionGateService`].
pub struct SessionGateServiceBuilder {
    config: AuthConfig,
    http_client: Option<Arc<dyn HttpClient>>,
    storage: Option<Arc<dyn SessionStorage>>,
    navigation: Option<Arc<dyn NavigationContext>>,
    clock: Option<Arc<dyn Clock>>,
    verifier: Option<Arc<dyn TokenVerifier>>,
    event_bus: Option<EventBus>,
}

impl SessionGateServiceBuilder {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            http_client: None,
            storage: None,
            navigation: None,
            clock: None,
            verifier: None,
            event_bus: None,
        }
    }

    pub fn http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn navigation(mut self, navigation: Arc<dyn NavigationContext>) -> Self {
        self.navigation = Some(navigation);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replaces the HTTP verifier. The HTTP client is still used for
    /// authenticated calls.
    pub fn verifier(mut self, verifier: Arc<dyn TokenVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Validates the configuration, fills defaults and wires components.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Runtime`] when the configuration is invalid
    /// - [`ServiceError::CapabilityMissing`] when a bridge has no default
    /// - [`ServiceError::Bridge`] when a default bridge fails to start
    pub fn build(self) -> Result<SessionGateService> {
        self.config.validate()?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => default_http_client()?,
        };
        let storage = match self.storage {
            Some(storage) => storage,
            None => default_storage()?,
        };
        let navigation = match self.navigation {
            Some(navigation) => navigation,
            None => default_navigation()?,
        };
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let verifier = self.verifier.unwrap_or_else(|| {
            Arc::new(AuthorityVerifier::new(http_client.clone(), &self.config))
                as Arc<dyn TokenVerifier>
        });
        let event_bus = self.event_bus.unwrap_or_default();

        let source = TokenSource::new(storage, navigation, &self.config);
        let session = AuthSession::new(
            self.config.clone(),
            source,
            verifier,
            clock,
            event_bus.clone(),
        );
        let gate = AuthGate::new(session.clone());
        let header_provider = Arc::new(AuthHeaderProvider::new(session.clone(), http_client));

        info!(
            verify_url = %self.config.verify_url(),
            permissive = self.config.permissive_mode(),
            "Session gate service ready"
        );

        Ok(SessionGateService {
            config: self.config,
            session,
            gate,
            header_provider,
            event_bus,
        })
    }
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn default_http_client() -> Result<Arc<dyn HttpClient>> {
    Ok(Arc::new(ReqwestHttpClient::new()?))
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(missing("HttpClient", "http_client"))
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn default_storage() -> Result<Arc<dyn SessionStorage>> {
    Ok(Arc::new(MemorySessionStorage::new()))
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn default_storage() -> Result<Arc<dyn SessionStorage>> {
    Err(missing("SessionStorage", "storage"))
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn default_navigation() -> Result<Arc<dyn NavigationContext>> {
    Ok(Arc::new(UrlNavigation::new()))
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn default_navigation() -> Result<Arc<dyn NavigationContext>> {
    Err(missing("NavigationContext", "navigation"))
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn missing(capability: &str, setter: &str) -> ServiceError {
    ServiceError::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "No default {} on this platform. Provide one with SessionGateServiceBuilder::{}().",
            capability, setter
        ),
    }
}
