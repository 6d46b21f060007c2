//! Notification repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use buygenius_core::{NotificationId, UserId};

use super::{RepositoryError, write_error};
use crate::models::Notification;

const NOTIFICATION_COLUMNS: &str = "id, user_id, message, is_read, created_at";

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: i32,
    user_id: i32,
    message: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(r: NotificationRow) -> Self {
        Self {
            id: NotificationId::new(r.id),
            user_id: UserId::new(r.user_id),
            message: r.message,
            is_read: r.is_read,
            created_at: r.created_at,
        }
    }
}

/// Repository for user notifications.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            r"
            SELECT {NOTIFICATION_COLUMNS}
            FROM marketplace.notifications
            WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    /// Store a notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the user does not exist.
    pub async fn create(
        &self,
        user_id: UserId,
        message: &str,
    ) -> Result<Notification, RepositoryError> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            r"
            INSERT INTO marketplace.notifications (user_id, message)
            VALUES ($1, $2)
            RETURNING {NOTIFICATION_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(message)
        .fetch_one(self.pool)
        .await
        .map_err(|e| write_error(e, &[]))?;

        Ok(Notification::from(row))
    }

    /// Mark one of the user's notifications read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such notification.
    pub async fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<Notification, RepositoryError> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            r"
            UPDATE marketplace.notifications
            SET is_read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING {NOTIFICATION_COLUMNS}
            "
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Notification::from(row))
    }

    /// Mark all of a user's notifications read. Returns how many changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE marketplace.notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete one of the user's notifications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such notification.
    pub async fn delete(&self, id: NotificationId, user_id: UserId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM marketplace.notifications WHERE id = $1 AND user_id = $2")
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
