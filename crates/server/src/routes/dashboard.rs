//! Role dashboards.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::{DashboardRepository, MessageRepository, RetailerRepository};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireRetailer};
use crate::models::{AdminDashboard, RetailerDashboard};
use crate::state::AppState;

/// Marketplace counts and the retailer approval queue.
///
/// GET /dashboard/admin
#[instrument(skip(state))]
pub async fn admin(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<AdminDashboard>> {
    let counts = DashboardRepository::new(state.pool())
        .marketplace_counts()
        .await?;
    let pending = RetailerRepository::new(state.pool())
        .list(Some(false))
        .await?;

    Ok(Json(AdminDashboard {
        users: counts.users,
        retailers: counts.retailers,
        pending_retailers: counts.pending_retailers,
        products: counts.products,
        categories: counts.categories,
        pending,
    }))
}

/// The caller's retailer with its numbers and inbox.
///
/// GET /dashboard/retailer
#[instrument(skip(state, current))]
pub async fn retailer(
    State(state): State<AppState>,
    RequireRetailer(current): RequireRetailer,
) -> Result<Json<RetailerDashboard>> {
    let retailer = RetailerRepository::new(state.pool())
        .get_by_user(current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("You do not have a retailer account".to_string()))?;

    let counts = DashboardRepository::new(state.pool())
        .retailer_counts(retailer.id)
        .await?;
    let messages = MessageRepository::new(state.pool())
        .list_received(current.id)
        .await?;

    Ok(Json(RetailerDashboard {
        retailer,
        products: counts.products,
        feedback: counts.feedback,
        messages,
    }))
}
