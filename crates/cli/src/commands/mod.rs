//! Subcommand implementations.
//!
//! Every command reads `BUYGENIUS_DATABASE_URL` (or `DATABASE_URL`) from the
//! environment, loading `.env` first if present.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use buygenius_server::db::{self, RepositoryError};
use buygenius_server::services::auth::AuthError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Invalid credentials or account details.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The database already holds marketplace data.
    #[error("Database already contains users; rerun with --reset to replace them")]
    AlreadySeeded,

    /// No user matched.
    #[error("No user with email: {0}")]
    UserNotFound(String),
}

/// Connect to the marketplace database.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("BUYGENIUS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("BUYGENIUS_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
