//! Search history.

use buygenius_core::{SearchHistoryId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One search term entered by a logged-in user.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHistoryEntry {
    pub id: SearchHistoryId,
    pub user_id: UserId,
    pub search_term: String,
    pub searched_at: DateTime<Utc>,
}
