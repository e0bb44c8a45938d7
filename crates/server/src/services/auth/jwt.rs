//! Access token signing and verification.
//!
//! Access tokens are short-lived HS256 JWTs. Refresh tokens are opaque and
//! handled separately (see the parent module).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_core::{UserId, UserRole};

use super::AuthError;

/// Signing and verification keys derived from the configured secret.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Derive both keys from the shared HS256 secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user.
    pub sub: UserId,
    /// The user's role at issue time.
    pub role: UserRole,
    /// Unique token ID.
    pub jti: Uuid,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Sign an access token for a user.
///
/// # Errors
///
/// Returns `AuthError::TokenSigning` if encoding fails.
pub fn issue(
    keys: &JwtKeys,
    user_id: UserId,
    role: UserRole,
    now: DateTime<Utc>,
    ttl_secs: u64,
) -> Result<String, AuthError> {
    let iat = now.timestamp();
    let claims = Claims {
        sub: user_id,
        role,
        jti: Uuid::new_v4(),
        iat,
        exp: iat + i64::try_from(ttl_secs).map_err(|_| AuthError::TokenSigning)?,
    };

    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
        .map_err(|_| AuthError::TokenSigning)
}

/// Verify an access token and return its claims.
///
/// # Errors
///
/// Returns `AuthError::ExpiredToken` if the token is past its expiry and
/// `AuthError::InvalidToken` for any other verification failure.
pub fn verify(keys: &JwtKeys, token: &str) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);

    jsonwebtoken::decode::<Claims>(token, &keys.decoding, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::new(b"test-secret-with-enough-length-0123456789")
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let keys = keys();
        let token = issue(&keys, UserId::new(42), UserRole::Seller, Utc::now(), 900)
            .expect("issue should succeed");

        let claims = verify(&keys, &token).expect("verify should succeed");
        assert_eq!(claims.sub, UserId::new(42));
        assert_eq!(claims.role, UserRole::Seller);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = keys();
        let past = Utc::now() - chrono::Duration::hours(2);
        let token =
            issue(&keys, UserId::new(1), UserRole::Buyer, past, 900).expect("issue should succeed");

        let err = verify(&keys, &token).expect_err("expired token must fail");
        assert!(matches!(err, AuthError::ExpiredToken));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue(&keys(), UserId::new(1), UserRole::Buyer, Utc::now(), 900)
            .expect("issue should succeed");

        let other = JwtKeys::new(b"a-completely-different-secret-abcdefgh");
        let err = verify(&other, &token).expect_err("wrong key must fail");
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = verify(&keys(), "not.a.jwt").expect_err("garbage must fail");
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
