//! Bearer credential decoding shared across Coursework services.
//!
//! This module provides:
//! - Size limits for DoS prevention
//! - Clock skew constants for iat validation
//! - Bearer header parsing
//! - Signature-verifying decoding of user credentials
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only HS256 is accepted; the signature is always verified
//! - `exp` is required and validated, `iat` may not be in the future beyond the skew
//! - Generic error messages prevent information leakage
//! - The `sub` field in Claims is redacted in Debug output
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::{bearer_token, CredentialDecoder, DEFAULT_CLOCK_SKEW};
//!
//! let decoder = CredentialDecoder::hs256(&secret, DEFAULT_CLOCK_SKEW);
//! let token = bearer_token(header_value).ok_or(...)?;
//! let claims = decoder.decode(token)?;
//! let user_id = claims.sub;
//! ```

use crate::secret::{ExposeSecret, SecretString};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// JWTs larger than this size are rejected BEFORE any parsing or signature
/// verification. Typical user tokens are well under 1KB.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Default JWT clock skew tolerance (5 minutes).
///
/// Applied as leeway to `exp` and as the maximum amount an `iat` claim may sit
/// in the future.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Maximum allowed JWT clock skew tolerance (10 minutes).
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

/// Authorization scheme prefix expected on the `Authorization` header.
const BEARER_PREFIX: &str = "Bearer ";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while decoding a bearer credential.
///
/// Note: Error messages are intentionally generic to prevent information leakage.
/// Detailed information is logged at debug level for troubleshooting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token format is invalid (not a valid JWT structure or claims).
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Signature does not verify against the configured key.
    #[error("The access token is invalid or expired")]
    InvalidSignature,

    /// Token `exp` claim is in the past.
    #[error("The access token is invalid or expired")]
    Expired,

    /// Token `iat` claim is too far in the future.
    #[error("The access token is invalid or expired")]
    IatTooFarInFuture,

    /// Token has no usable `sub` claim.
    #[error("User ID not found in token")]
    MissingSubject,
}

// =============================================================================
// Claims Types
// =============================================================================

/// User credential claims.
///
/// Only `sub` is load-bearing for authorization; the remaining fields are
/// carried for logging and future use.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier) - redacted in Debug output.
    ///
    /// Defaults to empty so an absent `sub` is reported as `MissingSubject`.
    #[serde(default)]
    pub sub: String,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Issued-at timestamp (Unix epoch seconds).
    #[serde(default)]
    pub iat: i64,

    /// Optional role hint issued by the identity provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Custom Debug implementation that redacts the `sub` field.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .field("role", &self.role)
            .finish()
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// Verifies and decodes bearer credentials.
///
/// Built once at startup from the shared signing secret and shared across
/// handlers behind an `Arc`.
pub struct CredentialDecoder {
    key: DecodingKey,
    validation: Validation,
    clock_skew: Duration,
}

impl fmt::Debug for CredentialDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialDecoder")
            .field("key", &"[REDACTED]")
            .field("algorithms", &self.validation.algorithms)
            .field("clock_skew", &self.clock_skew)
            .finish()
    }
}

impl CredentialDecoder {
    /// Create a decoder that verifies HS256 signatures with `secret`.
    ///
    /// `clock_skew` is applied as `exp` leeway and as the `iat` tolerance.
    #[must_use]
    pub fn hs256(secret: &SecretString, clock_skew: Duration) -> Self {
        let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = clock_skew.as_secs();
        // Audience is not part of the credential contract
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key,
            validation,
            clock_skew,
        }
    }

    /// Verify `token` and return its claims.
    ///
    /// # Errors
    ///
    /// - `TokenTooLarge` - token exceeds [`MAX_JWT_SIZE_BYTES`]
    /// - `InvalidSignature` - signature does not verify
    /// - `Expired` - `exp` is in the past (beyond the skew)
    /// - `IatTooFarInFuture` - `iat` is in the future (beyond the skew)
    /// - `MissingSubject` - `sub` is absent or empty
    /// - `MalformedToken` - anything else
    pub fn decode(&self, token: &str) -> Result<Claims, JwtValidationError> {
        // Check token size first (DoS prevention)
        if token.len() > MAX_JWT_SIZE_BYTES {
            tracing::debug!(
                target: "common.jwt",
                token_size = token.len(),
                max_size = MAX_JWT_SIZE_BYTES,
                "Token rejected: size exceeds maximum allowed"
            );
            return Err(JwtValidationError::TokenTooLarge);
        }

        let token_data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(target: "common.jwt", error = %e, "Token verification failed");
            match e.kind() {
                ErrorKind::InvalidSignature => JwtValidationError::InvalidSignature,
                ErrorKind::ExpiredSignature => JwtValidationError::Expired,
                _ => JwtValidationError::MalformedToken,
            }
        })?;

        let claims = token_data.claims;

        validate_iat(claims.iat, self.clock_skew)?;

        if claims.sub.trim().is_empty() {
            tracing::debug!(target: "common.jwt", "Token rejected: empty sub claim");
            return Err(JwtValidationError::MissingSubject);
        }

        Ok(claims)
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// Returns `None` when the scheme is not `Bearer` or the token is empty.
#[must_use]
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Validate the `iat` (issued-at) claim with clock skew tolerance.
///
/// # Errors
///
/// Returns `JwtValidationError::IatTooFarInFuture` if the iat timestamp is more than
/// `clock_skew` in the future.
pub fn validate_iat(iat: i64, clock_skew: Duration) -> Result<(), JwtValidationError> {
    let now = chrono::Utc::now().timestamp();
    validate_iat_at(iat, clock_skew, now)
}

/// Deterministic `iat` validation against an explicit `now` timestamp.
pub(crate) fn validate_iat_at(
    iat: i64,
    clock_skew: Duration,
    now: i64,
) -> Result<(), JwtValidationError> {
    // Safe cast: clock_skew is bounded to MAX_CLOCK_SKEW (600 seconds), well within i64 range
    #[allow(clippy::cast_possible_wrap)]
    let clock_skew_secs = clock_skew.as_secs() as i64;
    let max_iat = now + clock_skew_secs;

    if iat > max_iat {
        tracing::debug!(
            target: "common.jwt",
            iat = iat,
            now = now,
            max_allowed = max_iat,
            clock_skew_secs = clock_skew_secs,
            "Token rejected: iat too far in the future"
        );
        return Err(JwtValidationError::IatTooFarInFuture);
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::cast_possible_wrap)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "unit-test-signing-secret";

    fn decoder() -> CredentialDecoder {
        CredentialDecoder::hs256(&SecretString::from(SECRET), DEFAULT_CLOCK_SKEW)
    }

    fn sign(claims: &serde_json::Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    // -------------------------------------------------------------------------
    // Constants Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_max_jwt_size_is_8kb() {
        assert_eq!(MAX_JWT_SIZE_BYTES, 8192);
    }

    #[test]
    fn test_clock_skew_bounds() {
        assert_eq!(DEFAULT_CLOCK_SKEW, Duration::from_secs(300));
        assert_eq!(MAX_CLOCK_SKEW, Duration::from_secs(600));
        assert!(DEFAULT_CLOCK_SKEW < MAX_CLOCK_SKEW);
    }

    // -------------------------------------------------------------------------
    // bearer_token Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_bearer_token_extracts_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
    }

    #[test]
    fn test_bearer_token_rejects_empty_token() {
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer    "), None);
    }

    // -------------------------------------------------------------------------
    // CredentialDecoder Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_decode_valid_token() {
        let token = sign(
            &serde_json::json!({ "sub": "user-42", "exp": now() + 600, "iat": now() }),
            SECRET,
        );

        let claims = decoder().decode(&token).unwrap();
        assert_eq!(claims.sub, "user-42");
        assert!(claims.role.is_none());
    }

    #[test]
    fn test_decode_keeps_role_claim() {
        let token = sign(
            &serde_json::json!({ "sub": "user-42", "exp": now() + 600, "role": "instructor" }),
            SECRET,
        );

        let claims = decoder().decode(&token).unwrap();
        assert_eq!(claims.role.as_deref(), Some("instructor"));
    }

    #[test]
    fn test_decode_rejects_wrong_signature() {
        let token = sign(
            &serde_json::json!({ "sub": "user-42", "exp": now() + 600 }),
            "some-other-secret",
        );

        assert_eq!(
            decoder().decode(&token),
            Err(JwtValidationError::InvalidSignature)
        );
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        // Well beyond the 5 minute leeway
        let token = sign(
            &serde_json::json!({ "sub": "user-42", "exp": now() - 3600 }),
            SECRET,
        );

        assert_eq!(decoder().decode(&token), Err(JwtValidationError::Expired));
    }

    #[test]
    fn test_decode_rejects_future_iat() {
        let token = sign(
            &serde_json::json!({ "sub": "user-42", "exp": now() + 7200, "iat": now() + 3600 }),
            SECRET,
        );

        assert_eq!(
            decoder().decode(&token),
            Err(JwtValidationError::IatTooFarInFuture)
        );
    }

    #[test]
    fn test_decode_rejects_missing_sub() {
        let token = sign(&serde_json::json!({ "exp": now() + 600 }), SECRET);

        assert_eq!(
            decoder().decode(&token),
            Err(JwtValidationError::MissingSubject)
        );
    }

    #[test]
    fn test_claims_without_sub_deserialize_as_empty() {
        let claims: Claims = serde_json::from_value(serde_json::json!({ "exp": 1 })).unwrap();
        assert!(claims.sub.is_empty());
    }

    #[test]
    fn test_decode_rejects_empty_sub() {
        let token = sign(&serde_json::json!({ "sub": "", "exp": now() + 600 }), SECRET);

        assert_eq!(
            decoder().decode(&token),
            Err(JwtValidationError::MissingSubject)
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(
            decoder().decode("not-a-jwt"),
            Err(JwtValidationError::MalformedToken)
        );
    }

    #[test]
    fn test_decode_rejects_oversized_token() {
        let oversized = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        assert_eq!(
            decoder().decode(&oversized),
            Err(JwtValidationError::TokenTooLarge)
        );
    }

    #[test]
    fn test_decoder_debug_redacts_key() {
        let debug_str = format!("{:?}", decoder());
        assert!(!debug_str.contains(SECRET));
        assert!(debug_str.contains("[REDACTED]"));
    }

    // -------------------------------------------------------------------------
    // iat Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_validate_iat_at_boundary() {
        let now = 1_700_000_000;
        let skew = Duration::from_secs(300);

        assert!(validate_iat_at(now, skew, now).is_ok());
        assert!(validate_iat_at(now + 300, skew, now).is_ok());
        assert_eq!(
            validate_iat_at(now + 301, skew, now),
            Err(JwtValidationError::IatTooFarInFuture)
        );
        assert!(validate_iat_at(0, skew, now).is_ok());
    }

    // -------------------------------------------------------------------------
    // Claims Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_claims_debug_redacts_sub() {
        let claims = Claims {
            sub: "secret-user-id".to_string(),
            exp: 1_234_567_890,
            iat: 1_234_567_800,
            role: None,
        };

        let debug_str = format!("{:?}", claims);
        assert!(!debug_str.contains("secret-user-id"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
