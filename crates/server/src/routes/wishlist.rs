//! Wishlist handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use buygenius_core::{ProductId, WishlistId};

use crate::db::WishlistRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::WishlistItem;
use crate::state::AppState;

/// Body for saving a product.
#[derive(Debug, Deserialize)]
pub struct AddToWishlistRequest {
    pub product_id: ProductId,
}

/// GET /wishlist
#[instrument(skip(state, current))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<WishlistItem>>> {
    let items = WishlistRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;
    Ok(Json(items))
}

/// POST /wishlist
#[instrument(skip(state, current))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiJson(req): ApiJson<AddToWishlistRequest>,
) -> Result<(StatusCode, Json<WishlistItem>)> {
    let item = WishlistRepository::new(state.pool())
        .add(current.id, req.product_id)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// DELETE /wishlist/{id}
#[instrument(skip(state, current))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<WishlistId>,
) -> Result<StatusCode> {
    WishlistRepository::new(state.pool())
        .remove(id, current.id)
        .await
        .map_err(|e| AppError::from_repository(e, "Wishlist item not found"))?;
    Ok(StatusCode::NO_CONTENT)
}
