//! Direct messages.

use buygenius_core::{MessageId, ProductId, RetailerId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A message from one user to another, optionally about a product or
/// retailer.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub product_id: Option<ProductId>,
    pub retailer_id: Option<RetailerId>,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Whether `user` sent or received this message.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        self.sender_id == user || self.receiver_id == user
    }
}

/// Input for sending a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub product_id: Option<ProductId>,
    pub retailer_id: Option<RetailerId>,
    pub content: String,
}
