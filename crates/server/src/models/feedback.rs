//! Product feedback.

use buygenius_core::{FeedbackId, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A comment and optional star rating left on a product.
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub user_id: UserId,
    /// Author's username, joined in for display.
    pub username: String,
    pub product_id: ProductId,
    pub comment: Option<String>,
    /// 1 to 5 when present.
    pub rating: Option<i16>,
    pub feedback_date: DateTime<Utc>,
}

/// Input for leaving feedback.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub comment: Option<String>,
    pub rating: Option<i16>,
}
