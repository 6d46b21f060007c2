//! User domain types.

use buygenius_core::{Email, Role, UserId, Username};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A marketplace account.
///
/// The password hash never leaves the `db` and `services::auth` modules, so
/// this type is safe to serialize straight into responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub is_retailer: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Effective role derived from the account flags.
    #[must_use]
    pub const fn role(&self) -> Role {
        Role::from_flags(self.is_admin, self.is_retailer)
    }
}

/// Changes to an account. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<Username>,
    pub email: Option<Email>,
    pub password_hash: Option<String>,
    pub is_retailer: Option<bool>,
    pub is_admin: Option<bool>,
}

impl UserUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.is_retailer.is_none()
            && self.is_admin.is_none()
    }
}
