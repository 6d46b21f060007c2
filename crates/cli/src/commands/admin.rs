//! Admin user management commands.
//!
//! ```bash
//! bg-cli admin create -u admin -e admin@example.com -p 'long-password'
//! bg-cli admin promote -e someone@example.com
//! ```

use buygenius_core::{Email, UserId, Username};
use buygenius_server::db::{RepositoryError, UserRepository};
use buygenius_server::services::auth::{AuthError, hash_password, validate_password};

use super::{CommandError, connect};

/// Create a new admin user.
///
/// Input is validated before connecting.
///
/// # Errors
///
/// Returns an error if the input is invalid, the username or email is taken,
/// or the database is unreachable.
pub async fn create_user(
    username: &str,
    email: &str,
    password: &str,
) -> Result<UserId, CommandError> {
    let username = Username::parse(username).map_err(AuthError::from)?;
    let email = Email::parse(email).map_err(AuthError::from)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let pool = connect().await?;

    tracing::info!("Creating admin user: {} ({})", username, email);
    let user = UserRepository::new(&pool)
        .create(&username, &email, &password_hash, false, true)
        .await?;

    tracing::info!("Admin user created successfully! ID: {}", user.id);
    Ok(user.id)
}

/// Grant admin rights to an existing user.
///
/// # Errors
///
/// Returns an error if no user has this email or the database is unreachable.
pub async fn promote(email: &str) -> Result<(), CommandError> {
    let parsed = Email::parse(email).map_err(AuthError::from)?;

    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .promote_to_admin(&parsed)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CommandError::UserNotFound(email.to_owned()),
            other => CommandError::Repository(other),
        })?;

    tracing::info!("{} is now an admin (ID: {})", user.username, user.id);
    Ok(())
}
