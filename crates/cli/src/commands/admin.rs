//! Admin user management commands.
//!
//! Admin accounts cannot be created through the public registration endpoint;
//! this command is the only way to mint one.

use bazaar_core::{Email, UserRole};

use bazaar_server::db::UserRepository;
use bazaar_server::services::auth::{hash_password, validate_password};

use super::CommandError;

/// Create a new admin user.
///
/// # Errors
///
/// Returns `CommandError::Auth` for weak passwords,
/// `CommandError::Email` for malformed addresses, and
/// `CommandError::Repository` if the email is already taken.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, CommandError> {
    let email = Email::parse(email)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let pool = super::connect().await?;

    tracing::info!("Creating admin user: {email}");

    let user = UserRepository::new(&pool)
        .create(&email, &password_hash, name, UserRole::Admin)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(user.id.into())
}
