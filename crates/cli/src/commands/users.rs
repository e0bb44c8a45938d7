//! User moderation commands.

use bazaar_core::Email;

use bazaar_server::db::UserRepository;

use super::CommandError;

/// Ban or unban a user by email.
///
/// A ban takes effect at the user's next login or token refresh; access
/// tokens already in flight expire on their own within minutes.
///
/// # Errors
///
/// Returns `CommandError::UnknownUser` if no user has that email.
pub async fn set_banned(email: &str, banned: bool) -> Result<(), CommandError> {
    let email = Email::parse(email)?;

    let pool = super::connect().await?;
    let repo = UserRepository::new(&pool);

    let user = repo
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CommandError::UnknownUser(email.to_string()))?;

    repo.set_banned(user.id, banned).await?;

    if banned {
        tracing::info!("User {} banned", user.email);
    } else {
        tracing::info!("User {} unbanned", user.email);
    }

    Ok(())
}
