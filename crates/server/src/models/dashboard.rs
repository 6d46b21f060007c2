//! Dashboard summaries.

use serde::Serialize;

use super::{Message, Retailer};

/// Marketplace-wide counts plus the approval queue.
#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub users: i64,
    pub retailers: i64,
    pub pending_retailers: i64,
    pub products: i64,
    pub categories: i64,
    pub pending: Vec<Retailer>,
}

/// A retailer's own numbers and inbox.
#[derive(Debug, Clone, Serialize)]
pub struct RetailerDashboard {
    pub retailer: Retailer,
    pub products: i64,
    pub feedback: i64,
    pub messages: Vec<Message>,
}
