//! Feedback repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use buygenius_core::{FeedbackId, ProductId, UserId};

use super::{RepositoryError, write_error};
use crate::models::{Feedback, NewFeedback};

#[derive(sqlx::FromRow)]
struct FeedbackRow {
    id: i32,
    user_id: i32,
    username: String,
    product_id: i32,
    comment: Option<String>,
    rating: Option<i16>,
    feedback_date: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(r: FeedbackRow) -> Self {
        Self {
            id: FeedbackId::new(r.id),
            user_id: UserId::new(r.user_id),
            username: r.username,
            product_id: ProductId::new(r.product_id),
            comment: r.comment,
            rating: r.rating,
            feedback_date: r.feedback_date,
        }
    }
}

/// Repository for product feedback.
pub struct FeedbackRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FeedbackRepository<'a> {
    /// Create a new feedback repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Feedback on a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Feedback>, RepositoryError> {
        let rows = sqlx::query_as::<_, FeedbackRow>(
            r"
            SELECT f.id, f.user_id, u.username, f.product_id, f.comment, f.rating, f.feedback_date
            FROM marketplace.feedback f
            JOIN marketplace.users u ON u.id = f.user_id
            WHERE f.product_id = $1
            ORDER BY f.feedback_date DESC, f.id DESC
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Feedback::from).collect())
    }

    /// Get one feedback entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: FeedbackId) -> Result<Option<Feedback>, RepositoryError> {
        let row = sqlx::query_as::<_, FeedbackRow>(
            r"
            SELECT f.id, f.user_id, u.username, f.product_id, f.comment, f.rating, f.feedback_date
            FROM marketplace.feedback f
            JOIN marketplace.users u ON u.id = f.user_id
            WHERE f.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Feedback::from))
    }

    /// Record feedback.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the product does not exist.
    pub async fn create(&self, new: &NewFeedback) -> Result<Feedback, RepositoryError> {
        let row = sqlx::query_as::<_, FeedbackRow>(
            r"
            WITH f AS (
                INSERT INTO marketplace.feedback (user_id, product_id, comment, rating)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT f.id, f.user_id, u.username, f.product_id, f.comment, f.rating, f.feedback_date
            FROM f
            JOIN marketplace.users u ON u.id = f.user_id
            ",
        )
        .bind(new.user_id)
        .bind(new.product_id)
        .bind(new.comment.as_deref())
        .bind(new.rating)
        .fetch_one(self.pool)
        .await
        .map_err(|e| write_error(e, &[]))?;

        Ok(Feedback::from(row))
    }

    /// Delete a feedback entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry does not exist.
    pub async fn delete(&self, id: FeedbackId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM marketplace.feedback WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
