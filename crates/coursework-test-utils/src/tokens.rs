//! Credential minting for tests.
//!
//! Every harness configures its service with [`TEST_JWT_SECRET`], so tokens
//! minted here verify against any test server.

use common::jwt::{CredentialDecoder, DEFAULT_CLOCK_SKEW};
use common::secret::SecretString;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

/// Signing secret shared by all test servers.
pub const TEST_JWT_SECRET: &str = "coursework-test-signing-secret";

/// Sign arbitrary claims with the test secret.
pub fn sign_claims(claims: &serde_json::Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("HS256 signing with a static secret cannot fail")
}

/// A valid token for `sub`, expiring in one hour.
pub fn mint_token(sub: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    sign_claims(&serde_json::json!({
        "sub": sub,
        "iat": now,
        "exp": now + 3600,
    }))
}

/// A correctly signed token for `sub` that expired an hour ago.
pub fn mint_expired_token(sub: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    sign_claims(&serde_json::json!({
        "sub": sub,
        "iat": now - 7200,
        "exp": now - 3600,
    }))
}

/// `Authorization` header value carrying a valid token for `sub`.
pub fn bearer(sub: &str) -> String {
    format!("Bearer {}", mint_token(sub))
}

/// Decoder configured with the test secret.
pub fn test_decoder() -> CredentialDecoder {
    CredentialDecoder::hs256(&SecretString::from(TEST_JWT_SECRET), DEFAULT_CLOCK_SKEW)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::jwt::JwtValidationError;

    #[test]
    fn test_minted_token_verifies() {
        let claims = test_decoder().decode(&mint_token("dana")).unwrap();
        assert_eq!(claims.sub, "dana");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        assert_eq!(
            test_decoder().decode(&mint_expired_token("dana")).unwrap_err(),
            JwtValidationError::Expired
        );
    }

    #[test]
    fn test_bearer_prefix() {
        assert!(bearer("dana").starts_with("Bearer "));
    }
}
