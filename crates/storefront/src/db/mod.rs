//! Database operations for storefront `PostgreSQL`.
//!
//! # Database: `harbor_storefront`
//!
//! ## Tables
//!
//! - `products` - Catalog entries (name is unique)
//! - `pricing_tiers` - Ordered bundle prices per product
//! - `orders` / `order_items` - Placed orders, written in one transaction
//! - `reviews` - Product reviews; ratings are aggregated on read
//! - `contact_messages` - Contact form submissions waiting to be forwarded
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p harbor-cli -- migrate
//! ```

pub mod contact;
pub mod orders;
pub mod products;
pub mod reviews;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use contact::ContactRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A referenced entity does not exist.
    #[error("not found")]
    NotFound,
}

impl RepositoryError {
    /// Map a foreign key violation to [`RepositoryError::NotFound`].
    fn from_insert(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => Self::NotFound,
            _ => Self::Database(err),
        }
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
