//! Message repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use buygenius_core::{MessageId, ProductId, RetailerId, UserId};

use super::{RepositoryError, write_error};
use crate::models::{Message, NewMessage};

const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, product_id, retailer_id, content, sent_at";

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i32,
    sender_id: i32,
    receiver_id: i32,
    product_id: Option<i32>,
    retailer_id: Option<i32>,
    content: String,
    sent_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(r: MessageRow) -> Self {
        Self {
            id: MessageId::new(r.id),
            sender_id: UserId::new(r.sender_id),
            receiver_id: UserId::new(r.receiver_id),
            product_id: r.product_id.map(ProductId::new),
            retailer_id: r.retailer_id.map(RetailerId::new),
            content: r.content,
            sent_at: r.sent_at,
        }
    }
}

/// Repository for direct messages.
pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Messages a user sent or received, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            r"
            SELECT {MESSAGE_COLUMNS}
            FROM marketplace.messages
            WHERE sender_id = $1 OR receiver_id = $1
            ORDER BY sent_at DESC, id DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    /// Messages a user received, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_received(&self, user_id: UserId) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            r"
            SELECT {MESSAGE_COLUMNS}
            FROM marketplace.messages
            WHERE receiver_id = $1
            ORDER BY sent_at DESC, id DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    /// Get one message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM marketplace.messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Message::from))
    }

    /// Send a message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the receiver, product or
    /// retailer does not exist.
    pub async fn create(&self, new: &NewMessage) -> Result<Message, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            r"
            INSERT INTO marketplace.messages (sender_id, receiver_id, product_id, retailer_id, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MESSAGE_COLUMNS}
            "
        ))
        .bind(new.sender_id)
        .bind(new.receiver_id)
        .bind(new.product_id)
        .bind(new.retailer_id)
        .bind(&new.content)
        .fetch_one(self.pool)
        .await
        .map_err(|e| write_error(e, &[]))?;

        Ok(Message::from(row))
    }
}
