//! Session-related types.
//!
//! Types stored in the session for authentication state.

use buygenius_core::{Role, UserId};
use serde::{Deserialize, Serialize};

use super::User;

/// Session-stored user identity.
///
/// A cached copy of the account. The auth extractors compare it with the
/// stored row on every request and rewrite it when the flags drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's public handle.
    pub username: String,
    /// Elevated privileges.
    pub is_admin: bool,
    /// May own a retailer.
    pub is_retailer: bool,
}

impl CurrentUser {
    /// Effective role.
    #[must_use]
    pub const fn role(&self) -> Role {
        Role::from_flags(self.is_admin, self.is_retailer)
    }

    /// Whether this user may act on a record owned by `owner`.
    #[must_use]
    pub fn owns_or_admin(&self, owner: UserId) -> bool {
        self.is_admin || self.id == owner
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.to_string(),
            is_admin: user.is_admin,
            is_retailer: user.is_retailer,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shopper() -> CurrentUser {
        CurrentUser {
            id: UserId::new(5),
            username: "shopper".to_string(),
            is_admin: false,
            is_retailer: false,
        }
    }

    #[test]
    fn test_owns_or_admin() {
        let user = shopper();
        assert!(user.owns_or_admin(UserId::new(5)));
        assert!(!user.owns_or_admin(UserId::new(6)));

        let admin = CurrentUser {
            is_admin: true,
            ..shopper()
        };
        assert!(admin.owns_or_admin(UserId::new(6)));
    }

    #[test]
    fn test_role() {
        assert_eq!(shopper().role(), Role::Customer);
    }
}
