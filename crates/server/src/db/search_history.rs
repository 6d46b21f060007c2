//! Search history repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use buygenius_core::{SearchHistoryId, UserId};

use super::RepositoryError;
use crate::models::SearchHistoryEntry;

/// Entries kept when listing history.
const HISTORY_LIMIT: i64 = 50;

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: i32,
    user_id: i32,
    search_term: String,
    searched_at: DateTime<Utc>,
}

impl From<HistoryRow> for SearchHistoryEntry {
    fn from(r: HistoryRow) -> Self {
        Self {
            id: SearchHistoryId::new(r.id),
            user_id: UserId::new(r.user_id),
            search_term: r.search_term,
            searched_at: r.searched_at,
        }
    }
}

/// Repository for the `user_history` table.
pub struct SearchHistoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SearchHistoryRepository<'a> {
    /// Create a new search history repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a search term.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(&self, user_id: UserId, term: &str) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO marketplace.user_history (user_id, search_term) VALUES ($1, $2)")
            .bind(user_id)
            .bind(term)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Most recent searches first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<SearchHistoryEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r"
            SELECT id, user_id, search_term, searched_at
            FROM marketplace.user_history
            WHERE user_id = $1
            ORDER BY searched_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(HISTORY_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(SearchHistoryEntry::from).collect())
    }

    /// Forget all of a user's searches. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM marketplace.user_history WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
