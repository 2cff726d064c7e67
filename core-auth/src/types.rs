use core_runtime::logging::{mask_token, redact_if_sensitive};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one session object.
///
/// Appears in log spans and events so the lifecycle of a single session can
/// be followed across tasks.
///
/// # Examples
///
/// ```
/// use core_auth::SessionId;
///
/// let id = SessionId::from_string("550e8400-e29b-41d4-a716-446655440000").unwrap();
/// assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a session ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Opaque compact token as handed out by the identity provider.
///
/// Three dot-separated base64url segments. Only the claims segment is ever
/// decoded and the signature is never inspected here.
///
/// `Debug` masks the value so a token can't leak through a log line.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short, log-safe prefix of the token.
    pub fn masked(&self) -> String {
        mask_token(&self.0)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.masked()).finish()
    }
}

impl From<String> for Token {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for Token {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Where a token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenOrigin {
    /// Single-use query parameter on the current navigation.
    RequestParameter,
    /// Session storage from an earlier page load.
    Storage,
}

/// Decoded claims segment.
///
/// Registered claims (`iss`, `aud`, `sub`, `iat`, `exp`) are required to
/// decode at all. Identity fields default to empty and are rejected later by
/// the validator, which can then say which field was wrong. `permissions`
/// stays `None` when absent so the validator can tell "missing" from "empty".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type", default)]
    pub token_type: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub permissions: Option<BTreeSet<String>>,
}

/// Trusted identity of the current user.
///
/// Only ever built from claims that passed validation or from a
/// successful authority response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl Principal {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("email", &redact_if_sensitive("email", &self.email))
            .field("role", &self.role)
            .field("permissions", &self.permissions)
            .finish()
    }
}

/// How much the current principal can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustTier {
    /// The authority confirmed the token.
    ServerVerified,
    /// Only local structure and expiry checks passed (permissive mode).
    LocallyVerified,
}

impl TrustTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustTier::ServerVerified => "server_verified",
            TrustTier::LocallyVerified => "locally_verified",
        }
    }
}

impl fmt::Display for TrustTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "tier")]
pub enum SessionPhase {
    Uninitialized,
    Initializing,
    Authenticated(TrustTier),
    Unauthenticated,
}

impl SessionPhase {
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            SessionPhase::Authenticated(_) | SessionPhase::Unauthenticated
        )
    }
}

/// Why a verification did not authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationCode {
    /// The authority could not be reached or did not answer in time.
    ServerUnavailable,
    /// The authority answered and refused the token.
    Rejected,
    /// The authority answered with something unreadable.
    Unknown,
}

impl VerificationCode {
    /// Maps an authority-supplied code string. Unrecognised codes count as
    /// a rejection.
    pub fn from_authority(code: &str) -> Self {
        match code {
            "SERVER_UNAVAILABLE" => VerificationCode::ServerUnavailable,
            "UNKNOWN" => VerificationCode::Unknown,
            _ => VerificationCode::Rejected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationCode::ServerUnavailable => "SERVER_UNAVAILABLE",
            VerificationCode::Rejected => "REJECTED",
            VerificationCode::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of asking the authority about a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub authenticated: bool,
    pub principal: Option<Principal>,
    pub code: Option<VerificationCode>,
    /// Raw code string from the authority, if it sent one.
    pub authority_code: Option<String>,
    pub message: Option<String>,
}

impl VerificationOutcome {
    pub fn verified(principal: Principal) -> Self {
        Self {
            authenticated: true,
            principal: Some(principal),
            code: None,
            authority_code: None,
            message: None,
        }
    }

    pub fn failed(code: VerificationCode) -> Self {
        Self {
            authenticated: false,
            principal: None,
            code: Some(code),
            authority_code: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_authority_code(mut self, code: impl Into<String>) -> Self {
        self.authority_code = Some(code.into());
        self
    }

    /// The accepted principal, if the authority authenticated the token.
    pub fn accepted_principal(&self) -> Option<&Principal> {
        if self.authenticated {
            self.principal.as_ref()
        } else {
            None
        }
    }

    pub fn is_server_unavailable(&self) -> bool {
        self.code == Some(VerificationCode::ServerUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_creation() {
        assert_ne!(SessionId::new(), SessionId::new());
        assert!(SessionId::from_string("invalid-uuid").is_err());
    }

    #[test]
    fn test_token_debug_is_masked() {
        let token = Token::new("header.payload-with-secrets.signature");
        let debug = format!("{:?}", token);

        assert!(!debug.contains("secrets"));
        assert!(!debug.contains("signature"));
        assert_eq!(token.len(), 37);
    }

    #[test]
    fn test_principal_debug_redacts_email() {
        let principal = Principal {
            user_id: "u1".to_string(),
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            role: "user".to_string(),
            permissions: BTreeSet::from(["gen".to_string()]),
        };

        let debug = format!("{:?}", principal);
        assert!(!debug.contains("example.com"));
        assert!(principal.has_permission("gen"));
        assert!(!principal.has_permission("admin"));
        assert!(principal.has_role("user"));
    }

    #[test]
    fn test_claims_permissions_absent_vs_empty() {
        let base = r#""iss":"i","aud":"a","sub":"s","iat":1,"exp":2"#;

        let absent: Claims = serde_json::from_str(&format!("{{{}}}", base)).unwrap();
        assert_eq!(absent.permissions, None);
        assert_eq!(absent.token_type, "");

        let empty: Claims =
            serde_json::from_str(&format!("{{{},\"permissions\":[]}}", base)).unwrap();
        assert_eq!(empty.permissions, Some(BTreeSet::new()));
    }

    #[test]
    fn test_verification_code_mapping() {
        assert_eq!(
            VerificationCode::from_authority("SERVER_UNAVAILABLE"),
            VerificationCode::ServerUnavailable
        );
        assert_eq!(
            VerificationCode::from_authority("TOKEN_REVOKED"),
            VerificationCode::Rejected
        );
        assert_eq!(VerificationCode::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_outcome_accepted_principal_requires_authenticated() {
        let principal = Principal {
            user_id: "u1".to_string(),
            username: "bob".to_string(),
            email: "b@x.com".to_string(),
            role: "user".to_string(),
            permissions: BTreeSet::new(),
        };

        let mut outcome = VerificationOutcome::verified(principal);
        assert!(outcome.accepted_principal().is_some());

        outcome.authenticated = false;
        assert!(outcome.accepted_principal().is_none());
    }

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_value(SessionPhase::Authenticated(TrustTier::LocallyVerified))
            .unwrap();
        assert_eq!(json["phase"], "authenticated");
        assert_eq!(json["tier"], "locally_verified");
        assert!(!SessionPhase::Initializing.is_settled());
    }
}
