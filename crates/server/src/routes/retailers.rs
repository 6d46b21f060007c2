//! Retailer handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use buygenius_core::{RetailerId, UserId};

use crate::db::{ProductRepository, RetailerRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireAdmin, RequireAuth, refresh_current_user};
use crate::models::{
    CurrentUser, NewRetailer, Product, ProductFilter, Retailer, RetailerUpdate,
};
use crate::services::notifications::notify_best_effort;
use crate::state::AppState;

/// `?approved=` filter.
#[derive(Debug, Default, Deserialize)]
pub struct RetailerQuery {
    pub approved: Option<bool>,
}

/// Retailer creation body. Only admins may name another owner.
#[derive(Debug, Deserialize)]
pub struct CreateRetailerRequest {
    pub name: String,
    pub whatsapp_number: Option<String>,
    pub user_id: Option<UserId>,
}

/// Partial retailer update.
#[derive(Debug, Deserialize)]
pub struct UpdateRetailerRequest {
    pub name: Option<String>,
    pub whatsapp_number: Option<String>,
}

/// Trimmed, non-empty retailer name.
fn retailer_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Retailer name is required".to_string()));
    }
    Ok(name.to_string())
}

/// Whose retailer this request creates.
fn resolve_owner(current: &CurrentUser, requested: Option<UserId>) -> Result<UserId> {
    match requested {
        Some(owner) if owner != current.id => {
            if current.is_admin {
                Ok(owner)
            } else {
                Err(AppError::Forbidden(
                    "Only admins can create retailers for other users".to_string(),
                ))
            }
        }
        _ => Ok(current.id),
    }
}

async fn load(state: &AppState, id: RetailerId) -> Result<Retailer> {
    RetailerRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Retailer not found".to_string()))
}

fn ensure_owner_or_admin(current: &CurrentUser, retailer: &Retailer) -> Result<()> {
    if current.owns_or_admin(retailer.user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You can only manage your own retailer".to_string(),
        ))
    }
}

/// List retailers.
///
/// GET /retailers
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RetailerQuery>,
) -> Result<Json<Vec<Retailer>>> {
    let retailers = RetailerRepository::new(state.pool())
        .list(query.approved)
        .await?;
    Ok(Json(retailers))
}

/// Show one retailer.
///
/// GET /retailers/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RetailerId>,
) -> Result<Json<Retailer>> {
    Ok(Json(load(&state, id).await?))
}

/// Register a retailer. New retailers wait for admin approval.
///
/// POST /retailers
#[instrument(skip(state, session, current, req))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    ApiJson(req): ApiJson<CreateRetailerRequest>,
) -> Result<(StatusCode, Json<Retailer>)> {
    let name = retailer_name(&req.name)?;
    let owner = resolve_owner(&current, req.user_id)?;

    let retailer = RetailerRepository::new(state.pool())
        .create(&NewRetailer {
            name,
            user_id: owner,
            whatsapp_number: req.whatsapp_number,
        })
        .await?;

    if owner == current.id && !current.is_retailer {
        let refreshed = CurrentUser {
            is_retailer: true,
            ..current
        };
        refresh_current_user(&session, &refreshed).await?;
    }

    tracing::info!(retailer_id = %retailer.id, owner = %owner, "retailer registered");
    Ok((StatusCode::CREATED, Json(retailer)))
}

/// Update a retailer.
///
/// PUT /retailers/{id}
#[instrument(skip(state, current, req))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<RetailerId>,
    ApiJson(req): ApiJson<UpdateRetailerRequest>,
) -> Result<Json<Retailer>> {
    let retailer = load(&state, id).await?;
    ensure_owner_or_admin(&current, &retailer)?;

    let update = RetailerUpdate {
        name: req.name.as_deref().map(retailer_name).transpose()?,
        whatsapp_number: req.whatsapp_number,
    };

    let retailer = RetailerRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(|e| AppError::from_repository(e, "Retailer not found"))?;
    Ok(Json(retailer))
}

/// Delete a retailer and its products.
///
/// DELETE /retailers/{id}
#[instrument(skip(state, session, current))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<RetailerId>,
) -> Result<StatusCode> {
    let retailer = load(&state, id).await?;
    ensure_owner_or_admin(&current, &retailer)?;

    RetailerRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| AppError::from_repository(e, "Retailer not found"))?;

    if retailer.user_id == current.id {
        let refreshed = CurrentUser {
            is_retailer: false,
            ..current
        };
        refresh_current_user(&session, &refreshed).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Approve a retailer and tell its owner.
///
/// POST /retailers/{id}/approve
#[instrument(skip(state, admin))]
pub async fn approve(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<RetailerId>,
) -> Result<Json<Retailer>> {
    let retailer = RetailerRepository::new(state.pool())
        .approve(id)
        .await
        .map_err(|e| AppError::from_repository(e, "Retailer not found"))?;

    notify_best_effort(
        state.pool(),
        state.notifications(),
        retailer.user_id,
        &format!("Your retailer \"{}\" has been approved", retailer.name),
    )
    .await;

    tracing::info!(retailer_id = %retailer.id, approved_by = %admin.id, "retailer approved");
    Ok(Json(retailer))
}

/// Products listed by a retailer.
///
/// GET /retailers/{id}/products
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RetailerId>,
) -> Result<Json<Vec<Product>>> {
    load(&state, id).await?;
    let products = ProductRepository::new(state.pool())
        .list(ProductFilter {
            retailer_id: Some(id),
            ..ProductFilter::default()
        })
        .await?;
    Ok(Json(products))
}
