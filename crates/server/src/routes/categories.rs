//! Category handlers. Writes are admin-only.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use buygenius_core::CategoryId;

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAdmin;
use crate::models::{Category, Product, ProductFilter};
use crate::state::AppState;

/// Body for creating or renaming a category.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

impl CategoryRequest {
    fn name(&self) -> Result<&str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Category name is required".to_string()));
        }
        Ok(name)
    }
}

/// GET /categories
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(CategoryRepository::new(state.pool()).list().await?))
}

/// GET /categories/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<Category>> {
    let category = CategoryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
    Ok(Json(category))
}

/// POST /categories
#[instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiJson(req): ApiJson<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = CategoryRepository::new(state.pool())
        .create(req.name()?)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /categories/{id}
#[instrument(skip(state, req))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(req): ApiJson<CategoryRequest>,
) -> Result<Json<Category>> {
    let category = CategoryRepository::new(state.pool())
        .rename(id, req.name()?)
        .await
        .map_err(|e| AppError::from_repository(e, "Category not found"))?;
    Ok(Json(category))
}

/// DELETE /categories/{id}
///
/// Products in the category are deleted with it.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| AppError::from_repository(e, "Category not found"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /categories/{id}/products
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<Vec<Product>>> {
    CategoryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    let products = ProductRepository::new(state.pool())
        .list(ProductFilter {
            category_id: Some(id),
            ..ProductFilter::default()
        })
        .await?;
    Ok(Json(products))
}
