//! Authentication service.
//!
//! Password login issues a short-lived HS256 access token plus an opaque
//! refresh token. Refresh tokens rotate on every use: the presented token is
//! revoked and a successor is issued in the same family. Presenting an
//! already-revoked token is treated as theft and voids the whole family.

mod error;
pub mod jwt;

pub use error::AuthError;
pub use jwt::{Claims, JwtKeys};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::RngCore as _;
use serde::Serialize;
use sha2::{Digest as _, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_core::{Email, UserRole};

use crate::db::RepositoryError;
use crate::db::tokens::RefreshTokenRepository;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Entropy in the opaque refresh token, before encoding.
const REFRESH_TOKEN_BYTES: usize = 32;

/// Access + refresh token pair returned on login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    /// Bearer token for the `Authorization` header.
    pub access_token: String,
    /// Opaque refresh token. Shown to the client exactly once.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Handles registration, login, refresh token rotation, and logout.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: RefreshTokenRepository<'a>,
    keys: &'a JwtKeys,
    access_ttl_secs: u64,
    refresh_ttl_days: i64,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        keys: &'a JwtKeys,
        access_ttl_secs: u64,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: RefreshTokenRepository::new(pool),
            keys,
            access_ttl_secs,
            refresh_ttl_days,
        }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, &password_hash, display_name, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password, starting a fresh refresh token family.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::UserBanned` if the account is banned.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, TokenPair), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if user.banned {
            return Err(AuthError::UserBanned);
        }

        let pair = self.issue_pair(&user, Uuid::new_v4(), Utc::now()).await?;

        Ok((user, pair))
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// The presented token is revoked and its successor stays in the same
    /// family. A token that was already rotated out means the token leaked,
    /// so every live token in its family is revoked.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is unknown or revoked.
    /// Returns `AuthError::ExpiredToken` if the token is past its expiry.
    /// Returns `AuthError::UserBanned` if the account was banned meanwhile.
    pub async fn refresh(&self, refresh_token: &str) -> Result<(User, TokenPair), AuthError> {
        let now = Utc::now();
        let digest = digest_refresh_token(refresh_token);

        let record = self
            .tokens
            .get_by_digest(&digest)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if record.revoked {
            // Reuse of a rotated-out token: void the whole family
            let revoked = self.tokens.revoke_family(record.family).await?;
            tracing::warn!(
                user_id = %record.user_id,
                family = %record.family,
                revoked,
                "Refresh token reuse detected, family revoked"
            );
            return Err(AuthError::InvalidToken);
        }

        if record.is_expired(now) {
            return Err(AuthError::ExpiredToken);
        }

        let user = self
            .users
            .get_by_id(record.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if user.banned {
            self.tokens.revoke_family(record.family).await?;
            return Err(AuthError::UserBanned);
        }

        self.tokens.revoke(record.id).await?;
        let pair = self.issue_pair(&user, record.family, now).await?;

        Ok((user, pair))
    }

    /// Revoke the presented refresh token and every sibling in its family.
    ///
    /// Unknown tokens are a no-op so logout is idempotent.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let digest = digest_refresh_token(refresh_token);

        if let Some(record) = self.tokens.get_by_digest(&digest).await? {
            self.tokens.revoke_family(record.family).await?;
        }

        Ok(())
    }

    async fn issue_pair(
        &self,
        user: &User,
        family: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        let access_token = jwt::issue(self.keys, user.id, user.role, now, self.access_ttl_secs)?;

        let (refresh_token, digest) = generate_refresh_token();
        let expires_at = now + chrono::Duration::days(self.refresh_ttl_days);
        self.tokens
            .insert(user.id, &digest, family, expires_at)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl_secs,
        })
    }
}

/// Generate an opaque refresh token and the digest to store for it.
#[must_use]
pub fn generate_refresh_token() -> (String, String) {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);

    let raw = URL_SAFE_NO_PAD.encode(bytes);
    let digest = digest_refresh_token(&raw);

    (raw, digest)
}

/// SHA-256 digest of a refresh token, hex-encoded.
#[must_use]
pub fn digest_refresh_token(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write as _;
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` for passwords shorter than 8 characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse battery").expect("hash should succeed");
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(verify_password("wrong password", &hash).is_err());
    }

    #[test]
    fn test_short_password_rejected() {
        let err = validate_password("short").expect_err("short password must fail");
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        let (a, _) = generate_refresh_token();
        let (b, _) = generate_refresh_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_refresh_token_digest_is_stable() {
        let (raw, digest) = generate_refresh_token();
        assert_eq!(digest_refresh_token(&raw), digest);
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_raw_token_is_url_safe() {
        let (raw, _) = generate_refresh_token();
        assert!(
            raw.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
