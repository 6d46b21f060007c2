//! Retailer domain types.

use buygenius_core::{RetailerId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A seller profile attached to exactly one account.
///
/// Products can only be listed once an admin has approved the retailer.
#[derive(Debug, Clone, Serialize)]
pub struct Retailer {
    pub id: RetailerId,
    pub name: String,
    pub user_id: UserId,
    pub whatsapp_number: Option<String>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a retailer.
#[derive(Debug, Clone)]
pub struct NewRetailer {
    pub name: String,
    pub user_id: UserId,
    pub whatsapp_number: Option<String>,
}

/// Changes to a retailer. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct RetailerUpdate {
    pub name: Option<String>,
    pub whatsapp_number: Option<String>,
}
