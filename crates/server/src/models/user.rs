//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Email, UserId, UserRole};

/// A registered user.
///
/// The password hash is deliberately not part of this struct; it only ever
/// leaves the database through `UserRepository::get_password_hash`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address (unique, lowercase).
    pub email: Email,
    /// Display name shown on reviews and chat.
    pub display_name: String,
    /// Account role.
    pub role: UserRole,
    /// Banned users cannot log in or refresh tokens.
    #[serde(skip)]
    pub banned: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}
