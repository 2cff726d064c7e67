//! # Authentication Configuration
//!
//! Builder-based configuration for the session core.
//!
//! ## Overview
//!
//! [`AuthConfig`] carries everything the session needs to know about the
//! outside world that is not a host capability: where the verification
//! authority lives, which issuer and audience are trusted, which storage key
//! and query parameter carry the token, and how long a verification call may
//! take. Validation is fail-fast: an invalid configuration never reaches the
//! session.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::AuthConfig;
//!
//! let config = AuthConfig::builder()
//!     .authority_base_url("https://auth.example.com")
//!     .trusted_issuer("Example.Issuer")
//!     .trusted_audience("example-users")
//!     .login_redirect_url("https://example.com/login")
//!     .build()
//!     .expect("valid configuration");
//!
//! assert_eq!(config.verify_url(), "https://auth.example.com/verify_token");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::AuthConfig;
//!
//! // Missing trusted issuer and audience
//! let config = AuthConfig::builder()
//!     .authority_base_url("https://auth.example.com")
//!     .build()
//!     .expect("Should fail - trust anchors are required");
//! ```

use crate::error::{Error, Result};
use std::time::Duration;
use url::Url;

/// Default path of the verification endpoint, relative to the authority.
pub const DEFAULT_VERIFY_PATH: &str = "/verify_token";

/// Default session storage key holding the raw token.
pub const DEFAULT_STORAGE_KEY: &str = "jwt_token";

/// Default query parameter carrying a freshly issued token.
pub const DEFAULT_TOKEN_PARAM: &str = "token";

/// Default bound on a single verification call.
pub const DEFAULT_VERIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound accepted for `verification_timeout`.
pub const MAX_VERIFICATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Validated authentication configuration.
///
/// Construct with [`AuthConfig::builder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    authority_base_url: String,
    verify_path: String,
    trusted_issuer: String,
    trusted_audience: String,
    storage_key: String,
    token_param: String,
    login_redirect_url: Option<String>,
    verification_timeout: Duration,
    permissive_mode: bool,
}

impl AuthConfig {
    /// Creates a new builder for constructing an `AuthConfig`.
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::default()
    }

    /// Base URL of the verification authority, without a trailing slash.
    pub fn authority_base_url(&self) -> &str {
        &self.authority_base_url
    }

    pub fn verify_path(&self) -> &str {
        &self.verify_path
    }

    /// Full URL of the verification endpoint.
    pub fn verify_url(&self) -> String {
        format!("{}{}", self.authority_base_url, self.verify_path)
    }

    pub fn trusted_issuer(&self) -> &str {
        &self.trusted_issuer
    }

    pub fn trusted_audience(&self) -> &str {
        &self.trusted_audience
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn token_param(&self) -> &str {
        &self.token_param
    }

    pub fn login_redirect_url(&self) -> Option<&str> {
        self.login_redirect_url.as_deref()
    }

    pub fn verification_timeout(&self) -> Duration {
        self.verification_timeout
    }

    /// Whether an unreachable authority may be replaced by local validation.
    pub fn permissive_mode(&self) -> bool {
        self.permissive_mode
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.authority_base_url).map_err(|e| {
            Error::Config(format!(
                "Authority base URL '{}' is not a valid URL: {}",
                self.authority_base_url, e
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Authority base URL must use http or https, got '{}'",
                base.scheme()
            )));
        }

        if !self.verify_path.starts_with('/') {
            return Err(Error::Config(format!(
                "Verify path must start with '/', got '{}'",
                self.verify_path
            )));
        }

        if self.trusted_issuer.trim().is_empty() {
            return Err(Error::Config("Trusted issuer cannot be empty".to_string()));
        }

        if self.trusted_audience.trim().is_empty() {
            return Err(Error::Config(
                "Trusted audience cannot be empty".to_string(),
            ));
        }

        if self.storage_key.is_empty() {
            return Err(Error::Config("Storage key cannot be empty".to_string()));
        }

        if self.token_param.is_empty() {
            return Err(Error::Config(
                "Token query parameter name cannot be empty".to_string(),
            ));
        }

        if let Some(redirect) = &self.login_redirect_url {
            Url::parse(redirect).map_err(|e| {
                Error::Config(format!(
                    "Login redirect URL '{}' is not a valid absolute URL: {}",
                    redirect, e
                ))
            })?;
        }

        if self.verification_timeout.is_zero()
            || self.verification_timeout > MAX_VERIFICATION_TIMEOUT
        {
            return Err(Error::Config(format!(
                "Verification timeout must be between 1ms and {}s, got {:?}",
                MAX_VERIFICATION_TIMEOUT.as_secs(),
                self.verification_timeout
            )));
        }

        if self.permissive_mode && !cfg!(feature = "permissive-fallback") {
            return Err(Error::Config(
                "Permissive mode requires the `permissive-fallback` feature. \
                 It must never be enabled in production builds."
                    .to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for constructing [`AuthConfig`] instances.
#[derive(Debug, Default, Clone)]
pub struct AuthConfigBuilder {
    authority_base_url: Option<String>,
    verify_path: Option<String>,
    trusted_issuer: Option<String>,
    trusted_audience: Option<String>,
    storage_key: Option<String>,
    token_param: Option<String>,
    login_redirect_url: Option<String>,
    verification_timeout: Option<Duration>,
    permissive_mode: bool,
}

impl AuthConfigBuilder {
    /// Sets the base URL of the verification authority (required).
    pub fn authority_base_url(mut self, url: impl Into<String>) -> Self {
        self.authority_base_url = Some(url.into());
        self
    }

    /// Overrides the verification endpoint path (default `/verify_token`).
    pub fn verify_path(mut self, path: impl Into<String>) -> Self {
        self.verify_path = Some(path.into());
        self
    }

    /// Sets the issuer a token must carry to be trusted (required).
    pub fn trusted_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.trusted_issuer = Some(issuer.into());
        self
    }

    /// Sets the audience a token must carry to be trusted (required).
    pub fn trusted_audience(mut self, audience: impl Into<String>) -> Self {
        self.trusted_audience = Some(audience.into());
        self
    }

    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    pub fn token_param(mut self, name: impl Into<String>) -> Self {
        self.token_param = Some(name.into());
        self
    }

    /// Where hosts should send the user after logout.
    pub fn login_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.login_redirect_url = Some(url.into());
        self
    }

    pub fn verification_timeout(mut self, timeout: Duration) -> Self {
        self.verification_timeout = Some(timeout);
        self
    }

    /// Enables the local-validation fallback when the authority is
    /// unreachable. Only accepted with the `permissive-fallback` feature.
    pub fn permissive_mode(mut self, enabled: bool) -> Self {
        self.permissive_mode = enabled;
        self
    }

    /// Builds and validates the final `AuthConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required field is missing or any value
    /// fails [`AuthConfig::validate`].
    pub fn build(self) -> Result<AuthConfig> {
        let authority_base_url = self.authority_base_url.ok_or_else(|| {
            Error::Config(
                "Authority base URL is required. Use .authority_base_url() to set it."
                    .to_string(),
            )
        })?;

        let trusted_issuer = self.trusted_issuer.ok_or_else(|| {
            Error::Config(
                "Trusted issuer is required. Use .trusted_issuer() to set it.".to_string(),
            )
        })?;

        let trusted_audience = self.trusted_audience.ok_or_else(|| {
            Error::Config(
                "Trusted audience is required. Use .trusted_audience() to set it.".to_string(),
            )
        })?;

        let config = AuthConfig {
            authority_base_url: authority_base_url.trim_end_matches('/').to_string(),
            verify_path: self
                .verify_path
                .unwrap_or_else(|| DEFAULT_VERIFY_PATH.to_string()),
            trusted_issuer,
            trusted_audience,
            storage_key: self
                .storage_key
                .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
            token_param: self
                .token_param
                .unwrap_or_else(|| DEFAULT_TOKEN_PARAM.to_string()),
            login_redirect_url: self.login_redirect_url,
            verification_timeout: self
                .verification_timeout
                .unwrap_or(DEFAULT_VERIFICATION_TIMEOUT),
            permissive_mode: self.permissive_mode,
        };

        config.validate()?;

        Ok(config)
    }
}
