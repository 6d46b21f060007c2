//! Category domain type.

use buygenius_core::CategoryId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A product category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
