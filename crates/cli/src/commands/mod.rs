//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;
pub mod tokens;
pub mod users;

use sqlx::PgPool;
use thiserror::Error;

use bazaar_server::db::RepositoryError;
use bazaar_server::services::auth::AuthError;

/// Errors that can occur while running a CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password or email validation error.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Invalid email address.
    #[error("Invalid email: {0}")]
    Email(#[from] bazaar_core::EmailError),

    /// No user with the given email.
    #[error("No user with email: {0}")]
    UnknownUser(String),
}

/// Connect to the database named by `DATABASE_URL`.
///
/// # Errors
///
/// Returns `CommandError::MissingEnvVar` if `DATABASE_URL` is unset,
/// `CommandError::Database` if the connection fails.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(&database_url).await?)
}
