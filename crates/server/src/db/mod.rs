//! Database operations for the marketplace `PostgreSQL` database.
//!
//! # Schema: `marketplace`
//!
//! ## Tables
//!
//! - `users` - Accounts with `is_admin` / `is_retailer` flags
//! - `retailers` - One seller profile per retailer account, admin approved
//! - `categories` - Product categories
//! - `products` - Offers listed by retailers
//! - `feedback` - User comments and ratings on products
//! - `messages` - Direct messages between users, optionally about a product
//! - `wishlists` - Products saved by users
//! - `user_history` - Search terms entered by logged-in users
//! - `notifications` - Per-user notifications
//!
//! Sessions live in `tower_sessions.session`, managed by the session store.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p buygenius-cli -- migrate
//! ```

pub mod categories;
pub mod dashboard;
pub mod feedback;
pub mod messages;
pub mod notifications;
pub mod products;
pub mod retailers;
pub mod search_history;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use dashboard::DashboardRepository;
pub use feedback::FeedbackRepository;
pub use messages::MessageRepository;
pub use notifications::NotificationRepository;
pub use products::ProductRepository;
pub use retailers::RetailerRepository;
pub use search_history::SearchHistoryRepository;
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (e.g., duplicate email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Foreign key violation (e.g., unknown category).
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// A value the column cannot store (out of range, NUL byte, too long).
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        write_error(e, &[])
    }
}

/// Client-facing message for SQLSTATE data exceptions caused by input.
fn invalid_value_message(code: &str) -> Option<&'static str> {
    match code {
        "22001" => Some("value is too long"),
        "22003" => Some("numeric value is out of range"),
        "22021" | "22P05" => Some("text contains characters that cannot be stored"),
        _ => None,
    }
}

/// Classify a failed write.
///
/// Unique violations become `Conflict`, using the message registered for the
/// violated constraint in `conflicts` (or a generic one). Foreign key
/// violations become `InvalidReference` naming the constraint. Data
/// exceptions raised by bad input become `InvalidValue`.
pub(crate) fn write_error(e: sqlx::Error, conflicts: &[(&str, &str)]) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            let message = db_err
                .constraint()
                .and_then(|name| conflicts.iter().find(|(c, _)| *c == name))
                .map_or("record already exists", |(_, msg)| *msg);
            return RepositoryError::Conflict(message.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            let message = db_err
                .constraint()
                .map_or_else(|| "referenced record does not exist".to_owned(), |name| {
                    format!("referenced record does not exist ({name})")
                });
            return RepositoryError::InvalidReference(message);
        }
        if let Some(message) = db_err.code().as_deref().and_then(invalid_value_message) {
            return RepositoryError::InvalidValue(message.to_owned());
        }
    }
    RepositoryError::Database(e)
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
