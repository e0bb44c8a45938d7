//! Database operations for the marketplace `PostgreSQL` database.
//!
//! # Schema: `bazaar`
//!
//! ## Tables
//!
//! - `user` - Accounts (buyers, sellers, admins)
//! - `refresh_token` - Refresh token digests for rotation
//! - `store` - Seller-owned stores
//! - `product` / `product_variant` - Catalog
//! - `cart` / `cart_line` - Active carts
//! - `order` / `order_line` - Orders split per store at checkout
//! - `payment` - One payment record per order
//! - `promotion` - Discount codes
//! - `review` - Product reviews
//! - `notification` - User notifications
//! - `chat_room` / `chat_message` - Buyer-store conversations
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p bazaar-cli -- migrate
//! ```
//!
//! All queries use the runtime `sqlx` API (`query_as`/`query` with `.bind()`)
//! so the crate builds without a live database.

pub mod carts;
pub mod chat;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;
pub mod promotions;
pub mod reviews;
pub mod stores;
pub mod tokens;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use chat::ChatRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use payments::PaymentRepository;
pub use products::ProductRepository;
pub use promotions::PromotionRepository;
pub use reviews::ReviewRepository;
pub use stores::StoreRepository;
pub use tokens::RefreshTokenRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or slug).
    #[error("{0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique violations into `Conflict`.
    pub(crate) fn from_unique(e: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
