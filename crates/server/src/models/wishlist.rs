//! Wishlist entries.

use buygenius_core::{UserId, WishlistId};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Product;

/// A product saved by a user, with the product embedded.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistItem {
    pub id: WishlistId,
    pub user_id: UserId,
    pub added_at: DateTime<Utc>,
    pub product: Product,
}
