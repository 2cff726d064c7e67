//! # Token Codec
//!
//! Extracts [`Claims`] from the middle segment of a compact token.
//!
//! The signature segment is never checked here. Authenticity is the
//! authority's job; this module only answers "is this shaped like a token,
//! and what does it claim?".

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::error::{AuthError, Result};
use crate::types::{Claims, Token};

/// base64url engine accepting the segment with or without `=` padding.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes the claims segment of `token`.
///
/// # Errors
///
/// Returns [`AuthError::MalformedToken`] when:
/// - the token is not exactly three non-empty `.`-separated segments
/// - the middle segment is not base64url
/// - the decoded bytes are not UTF-8 JSON
/// - a required claim is missing or has the wrong type
///
/// # Examples
///
/// ```
/// use core_auth::{codec, AuthError, Token};
///
/// let err = codec::decode(&Token::new("only.two")).unwrap_err();
/// assert!(matches!(err, AuthError::MalformedToken(_)));
/// ```
pub fn decode(token: &Token) -> Result<Claims> {
    let payload = claims_segment(token.as_str())?;
    let bytes = decode_segment(payload)?;
    let json = std::str::from_utf8(&bytes)
        .map_err(|e| AuthError::MalformedToken(format!("claims segment is not UTF-8: {}", e)))?;

    serde_json::from_str(json)
        .map_err(|e| AuthError::MalformedToken(format!("claims segment is not valid claims JSON: {}", e)))
}

fn claims_segment(raw: &str) -> Result<&str> {
    let segments: Vec<&str> = raw.split('.').collect();
    if segments.len() != 3 {
        return Err(AuthError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(AuthError::MalformedToken("empty segment".to_string()));
    }
    Ok(segments[1])
}

fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    // Some issuers emit the standard alphabet; fold it into base64url first.
    let normalized: String = segment
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    SEGMENT_ENGINE
        .decode(normalized.as_bytes())
        .map_err(|e| AuthError::MalformedToken(format!("claims segment is not base64url: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
    use serde_json::json;

    fn token_with_payload(payload: &[u8]) -> Token {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        Token::new(format!("{}.{}.fake_signature", header, URL_SAFE_NO_PAD.encode(payload)))
    }

    fn full_claims() -> serde_json::Value {
        json!({
            "iss": "Example.Issuer",
            "aud": "example-users",
            "sub": "u1",
            "iat": 1_700_000_000,
            "exp": 1_700_003_600,
            "type": "access",
            "user_id": "u1",
            "username": "bob",
            "email": "b@x.com",
            "role": "user",
            "permissions": ["gen"]
        })
    }

    #[test]
    fn test_decode_valid_token() {
        let token = token_with_payload(full_claims().to_string().as_bytes());
        let claims = decode(&token).unwrap();

        assert_eq!(claims.iss, "Example.Issuer");
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.exp, 1_700_003_600);
        assert!(claims.permissions.unwrap().contains("gen"));
    }

    #[test]
    fn test_two_segments_is_malformed() {
        let result = decode(&Token::new("header.payload"));
        assert!(matches!(result, Err(AuthError::MalformedToken(_))));
    }

    #[test]
    fn test_four_segments_and_empty_segments_are_malformed() {
        assert!(decode(&Token::new("a.b.c.d")).is_err());
        assert!(decode(&Token::new("a..c")).is_err());
        assert!(decode(&Token::new("")).is_err());
        assert!(decode(&Token::new("..")).is_err());
    }

    #[test]
    fn test_non_base64_payload_is_malformed() {
        let result = decode(&Token::new("header.!!not-base64!!.sig"));
        assert!(matches!(result, Err(AuthError::MalformedToken(_))));
    }

    #[test]
    fn test_non_json_payload_is_malformed() {
        let token = token_with_payload(b"definitely not json");
        assert!(matches!(decode(&token), Err(AuthError::MalformedToken(_))));

        let token = token_with_payload(&[0xff, 0xfe, 0xfd]);
        assert!(matches!(decode(&token), Err(AuthError::MalformedToken(_))));
    }

    #[test]
    fn test_missing_required_claim_is_malformed() {
        let mut claims = full_claims();
        claims.as_object_mut().unwrap().remove("exp");
        let token = token_with_payload(claims.to_string().as_bytes());

        assert!(matches!(decode(&token), Err(AuthError::MalformedToken(_))));
    }

    #[test]
    fn test_padded_and_standard_alphabet_payloads_decode() {
        let payload = full_claims().to_string();

        let padded = base64::engine::general_purpose::URL_SAFE.encode(payload.as_bytes());
        let token = Token::new(format!("h.{}.s", padded));
        assert!(decode(&token).is_ok());

        let standard = STANDARD.encode(payload.as_bytes());
        let token = Token::new(format!("h.{}.s", standard));
        assert!(decode(&token).is_ok());
    }
}
