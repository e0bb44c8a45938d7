//! Database migration command.
//!
//! Applies the server's migrations from `crates/server/migrations/`. The
//! server never runs migrations on startup; this command is the only path.

use super::CommandError;

/// Run pending database migrations.
///
/// # Errors
///
/// Returns `CommandError::Migration` if a migration fails to apply.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
