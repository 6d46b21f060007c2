//! Account roles.

use serde::{Deserialize, Serialize};

/// The effective role of an account.
///
/// Accounts carry two independent flags (`is_admin`, `is_retailer`); the
/// role collapses them for logging and dashboards. Admin outranks retailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Elevated privileges over every resource.
    Admin,
    /// May own a retailer and list products once approved.
    Retailer,
    /// Regular shopper.
    Customer,
}

impl Role {
    /// Derive the role from the account flags.
    #[must_use]
    pub const fn from_flags(is_admin: bool, is_retailer: bool) -> Self {
        if is_admin {
            Self::Admin
        } else if is_retailer {
            Self::Retailer
        } else {
            Self::Customer
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Retailer => "retailer",
            Self::Customer => "customer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(Role::from_flags(false, false), Role::Customer);
        assert_eq!(Role::from_flags(false, true), Role::Retailer);
        assert_eq!(Role::from_flags(true, false), Role::Admin);
        assert_eq!(Role::from_flags(true, true), Role::Admin);
    }

    #[test]
    fn test_display() {
        assert_eq!(Role::Retailer.to_string(), "retailer");
    }
}
