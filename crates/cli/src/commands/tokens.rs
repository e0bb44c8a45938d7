//! Refresh token maintenance commands.

use chrono::Utc;

use bazaar_server::db::RefreshTokenRepository;

use super::CommandError;

/// Delete refresh tokens past their expiry. Intended for a cron job.
///
/// # Errors
///
/// Returns `CommandError::Repository` if the delete fails.
pub async fn prune() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    let deleted = RefreshTokenRepository::new(&pool)
        .delete_expired(Utc::now())
        .await?;

    tracing::info!("Pruned {deleted} expired refresh tokens");
    Ok(())
}
