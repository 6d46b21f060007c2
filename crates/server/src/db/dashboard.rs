//! Aggregate queries behind the dashboards.

use sqlx::PgPool;

use buygenius_core::RetailerId;

use super::RepositoryError;

/// Marketplace-wide counts.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct MarketplaceCounts {
    pub users: i64,
    pub retailers: i64,
    pub pending_retailers: i64,
    pub products: i64,
    pub categories: i64,
}

/// Counts scoped to one retailer.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct RetailerCounts {
    pub products: i64,
    pub feedback: i64,
}

/// Read-only aggregate queries.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    /// Create a new dashboard repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count every top-level record type.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn marketplace_counts(&self) -> Result<MarketplaceCounts, RepositoryError> {
        let counts = sqlx::query_as::<_, MarketplaceCounts>(
            r"
            SELECT
                (SELECT COUNT(*) FROM marketplace.users) AS users,
                (SELECT COUNT(*) FROM marketplace.retailers) AS retailers,
                (SELECT COUNT(*) FROM marketplace.retailers WHERE NOT approved) AS pending_retailers,
                (SELECT COUNT(*) FROM marketplace.products) AS products,
                (SELECT COUNT(*) FROM marketplace.categories) AS categories
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }

    /// Products listed by a retailer and feedback left on them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn retailer_counts(
        &self,
        retailer_id: RetailerId,
    ) -> Result<RetailerCounts, RepositoryError> {
        let counts = sqlx::query_as::<_, RetailerCounts>(
            r"
            SELECT
                (SELECT COUNT(*) FROM marketplace.products WHERE retailer_id = $1) AS products,
                (SELECT COUNT(*)
                   FROM marketplace.feedback f
                   JOIN marketplace.products p ON p.id = f.product_id
                  WHERE p.retailer_id = $1) AS feedback
            ",
        )
        .bind(retailer_id)
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }
}
