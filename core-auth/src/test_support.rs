//! Shared fakes for unit tests.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{Clock, NavigationContext, SessionStorage};
use chrono::{DateTime, TimeZone, Utc};
use core_runtime::config::AuthConfig;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::types::{Principal, Token, VerificationOutcome};
use crate::verifier::TokenVerifier;

pub const NOW: i64 = 1_700_000_000;
pub const ISSUER: &str = "Example.Issuer";
pub const AUDIENCE: &str = "example-users";

pub fn test_config() -> AuthConfig {
    AuthConfig::builder()
        .authority_base_url("https://auth.example.com")
        .trusted_issuer(ISSUER)
        .trusted_audience(AUDIENCE)
        .login_redirect_url("https://example.com/login")
        .verification_timeout(Duration::from_millis(200))
        .build()
        .unwrap()
}

pub fn permissive_config() -> AuthConfig {
    AuthConfig::builder()
        .authority_base_url("https://auth.example.com")
        .trusted_issuer(ISSUER)
        .trusted_audience(AUDIENCE)
        .permissive_mode(true)
        .build()
        .unwrap()
}

pub fn claims_json() -> Value {
    json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": "u1",
        "iat": NOW - 60,
        "exp": NOW + 3600,
        "type": "access",
        "user_id": "u1",
        "username": "bob",
        "email": "b@x.com",
        "role": "user",
        "permissions": ["gen"]
    })
}

pub fn make_token(claims: &Value) -> Token {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    Token::new(format!("{}.{}.fake_signature", header, payload))
}

pub fn valid_token() -> Token {
    make_token(&claims_json())
}

pub fn bob() -> Principal {
    Principal {
        user_id: "u1".to_string(),
        username: "bob".to_string(),
        email: "b@x.com".to_string(),
        role: "user".to_string(),
        permissions: BTreeSet::from(["gen".to_string()]),
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn with(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage
            .items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        storage
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.items.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.value(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> BridgeResult<()> {
        self.items.lock().unwrap().remove(key);
        Ok(())
    }
}

pub struct FailingStorage;

#[async_trait]
impl SessionStorage for FailingStorage {
    async fn get_item(&self, _key: &str) -> BridgeResult<Option<String>> {
        Err(BridgeError::Storage("storage disabled".to_string()))
    }

    async fn set_item(&self, _key: &str, _value: &str) -> BridgeResult<()> {
        Err(BridgeError::Storage("storage disabled".to_string()))
    }

    async fn remove_item(&self, _key: &str) -> BridgeResult<()> {
        Err(BridgeError::Storage("storage disabled".to_string()))
    }
}

#[derive(Debug)]
pub struct StaticNavigation {
    name: String,
    value: Mutex<Option<String>>,
}

impl StaticNavigation {
    pub fn new(name: &str, value: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            value: Mutex::new(value.map(str::to_string)),
        }
    }

    pub fn empty() -> Self {
        Self::new("token", None)
    }

    pub fn set(&self, value: Option<&str>) {
        *self.value.lock().unwrap() = value.map(str::to_string);
    }
}

impl NavigationContext for StaticNavigation {
    fn query_param(&self, name: &str) -> Option<String> {
        if name == self.name {
            self.value.lock().unwrap().clone()
        } else {
            None
        }
    }
}

pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.0, 0).single().unwrap_or_default()
    }
}

/// Verifier returning scripted outcomes and counting calls.
pub struct FakeVerifier {
    outcomes: Mutex<Vec<VerificationOutcome>>,
    calls: AtomicUsize,
    delay: Duration,
}

impl FakeVerifier {
    /// Always answers `outcome`.
    pub fn returning(outcome: VerificationOutcome) -> Self {
        Self::sequence(vec![outcome])
    }

    /// Answers each outcome in turn, repeating the last one.
    pub fn sequence(outcomes: Vec<VerificationOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenVerifier for FakeVerifier {
    async fn verify(&self, _token: &Token) -> VerificationOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.len() > 1 {
            outcomes.remove(0)
        } else {
            outcomes[0].clone()
        }
    }
}
