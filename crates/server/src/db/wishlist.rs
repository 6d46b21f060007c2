//! Wishlist repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use buygenius_core::{ProductId, UserId, WishlistId};

use super::products::{PRODUCT_COLUMNS, ProductRow};
use super::{RepositoryError, write_error};
use crate::models::{Product, WishlistItem};

const WISHLIST_CONFLICTS: &[(&str, &str)] =
    &[("wishlists_user_product_key", "Product already in wishlist")];

#[derive(sqlx::FromRow)]
struct WishlistRow {
    wishlist_id: i32,
    wishlist_user_id: i32,
    added_at: DateTime<Utc>,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl From<WishlistRow> for WishlistItem {
    fn from(r: WishlistRow) -> Self {
        Self {
            id: WishlistId::new(r.wishlist_id),
            user_id: UserId::new(r.wishlist_user_id),
            added_at: r.added_at,
            product: Product::from(r.product),
        }
    }
}

/// Repository for saved products.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's wishlist, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<WishlistItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistRow>(&format!(
            r"
            SELECT w.id AS wishlist_id, w.user_id AS wishlist_user_id, w.added_at,
                   {PRODUCT_COLUMNS}
            FROM marketplace.wishlists w
            JOIN marketplace.products p ON p.id = w.product_id
            WHERE w.user_id = $1
            ORDER BY w.added_at DESC, w.id DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(WishlistItem::from).collect())
    }

    /// Save a product to a user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already saved.
    /// Returns `RepositoryError::InvalidReference` if the product does not exist.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItem, RepositoryError> {
        let row = sqlx::query_as::<_, WishlistRow>(&format!(
            r"
            WITH w AS (
                INSERT INTO marketplace.wishlists (user_id, product_id)
                VALUES ($1, $2)
                RETURNING id, user_id, product_id, added_at
            )
            SELECT w.id AS wishlist_id, w.user_id AS wishlist_user_id, w.added_at,
                   {PRODUCT_COLUMNS}
            FROM w
            JOIN marketplace.products p ON p.id = w.product_id
            "
        ))
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| write_error(e, WISHLIST_CONFLICTS))?;

        Ok(WishlistItem::from(row))
    }

    /// Remove an entry, only if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such entry.
    pub async fn remove(&self, id: WishlistId, user_id: UserId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM marketplace.wishlists WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
