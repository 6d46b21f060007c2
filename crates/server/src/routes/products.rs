//! Product handlers.
//!
//! Anyone may browse. Listing requires an approved retailer (or an admin
//! acting for any retailer); edits are limited to the owning retailer and
//! admins.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use buygenius_core::{CategoryId, ProductId, RetailerId};

use crate::db::{CategoryRepository, FeedbackRepository, ProductRepository, RetailerRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireAuth, RequireRetailer};
use crate::models::{CurrentUser, NewProduct, Product, ProductDetail, ProductFilter, ProductUpdate};
use crate::state::AppState;

/// Body for listing a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub delivery_cost: Option<Decimal>,
    pub payment_mode: Option<String>,
    /// Required for admins without a retailer of their own.
    pub retailer_id: Option<RetailerId>,
    pub category_id: CategoryId,
    pub estimated_value: Option<Decimal>,
    pub marginal_benefit: Option<Decimal>,
    pub image_url: Option<String>,
}

/// Partial product update.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub delivery_cost: Option<Decimal>,
    pub payment_mode: Option<String>,
    pub category_id: Option<CategoryId>,
    pub estimated_value: Option<Decimal>,
    pub marginal_benefit: Option<Decimal>,
    pub image_url: Option<String>,
}

fn product_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Product name is required".to_string()));
    }
    Ok(name.to_string())
}

/// Whether `value` fits a `NUMERIC(precision, scale)` column once rounded.
fn fits_numeric(value: Decimal, precision: u32, scale: u32) -> bool {
    let limit = Decimal::from(10_i64.pow(precision - scale));
    value.round_dp(scale).abs() < limit
}

/// Prices and costs: `NUMERIC(14, 2)`, never negative.
fn money(field: &str, value: Decimal) -> Result<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::BadRequest(format!("{field} must not be negative")));
    }
    amount(field, value)
}

/// `NUMERIC(14, 2)` of either sign.
fn amount(field: &str, value: Decimal) -> Result<Decimal> {
    if !fits_numeric(value, 14, 2) {
        return Err(AppError::BadRequest(format!(
            "{field} must be less than 1000000000000"
        )));
    }
    Ok(value)
}

/// `NUMERIC(10, 4)`.
fn marginal_benefit(value: Decimal) -> Result<Decimal> {
    if !fits_numeric(value, 10, 4) {
        return Err(AppError::BadRequest(
            "marginal_benefit must be between -1000000 and 1000000".to_string(),
        ));
    }
    Ok(value)
}

impl CreateProductRequest {
    fn into_new_product(self, retailer_id: RetailerId) -> Result<NewProduct> {
        Ok(NewProduct {
            name: product_name(&self.name)?,
            price: money("price", self.price)?,
            description: self.description,
            delivery_cost: money("delivery_cost", self.delivery_cost.unwrap_or_default())?,
            payment_mode: self.payment_mode,
            retailer_id,
            category_id: self.category_id,
            estimated_value: self
                .estimated_value
                .map(|v| amount("estimated_value", v))
                .transpose()?,
            marginal_benefit: self.marginal_benefit.map(marginal_benefit).transpose()?,
            image_url: self.image_url,
        })
    }
}

impl UpdateProductRequest {
    fn into_update(self) -> Result<ProductUpdate> {
        Ok(ProductUpdate {
            name: self.name.as_deref().map(product_name).transpose()?,
            price: self.price.map(|v| money("price", v)).transpose()?,
            description: self.description,
            delivery_cost: self
                .delivery_cost
                .map(|v| money("delivery_cost", v))
                .transpose()?,
            payment_mode: self.payment_mode,
            category_id: self.category_id,
            estimated_value: self
                .estimated_value
                .map(|v| amount("estimated_value", v))
                .transpose()?,
            marginal_benefit: self.marginal_benefit.map(marginal_benefit).transpose()?,
            image_url: self.image_url,
        })
    }
}

/// Pick the retailer a new product is listed under.
async fn listing_retailer(
    state: &AppState,
    current: &CurrentUser,
    requested: Option<RetailerId>,
) -> Result<RetailerId> {
    let retailers = RetailerRepository::new(state.pool());

    if current.is_admin {
        if let Some(id) = requested {
            return Ok(id);
        }
        return match retailers.get_by_user(current.id).await? {
            Some(own) => Ok(own.id),
            None => Err(AppError::BadRequest("retailer_id is required".to_string())),
        };
    }

    let own = retailers
        .get_by_user(current.id)
        .await?
        .ok_or_else(|| AppError::Forbidden("You do not have a retailer account".to_string()))?;
    if !own.approved {
        return Err(AppError::Forbidden(
            "Your retailer account is awaiting approval".to_string(),
        ));
    }
    if requested.is_some_and(|id| id != own.id) {
        return Err(AppError::Forbidden(
            "You can only list products for your own retailer".to_string(),
        ));
    }
    Ok(own.id)
}

/// Load a product the current user may modify.
async fn load_owned(state: &AppState, current: &CurrentUser, id: ProductId) -> Result<Product> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if current.is_admin {
        return Ok(product);
    }

    let owner = RetailerRepository::new(state.pool())
        .get_by_id(product.retailer_id)
        .await?
        .map(|r| r.user_id);
    if owner != Some(current.id) {
        return Err(AppError::Forbidden(
            "You can only manage your own products".to_string(),
        ));
    }
    Ok(product)
}

/// GET /products
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductRepository::new(state.pool()).list(filter).await?))
}

/// Product with its retailer, category and feedback.
///
/// GET /products/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let retailer = RetailerRepository::new(state.pool())
        .get_by_id(product.retailer_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("product {id} has no retailer")))?;
    let category = CategoryRepository::new(state.pool())
        .get_by_id(product.category_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("product {id} has no category")))?;
    let feedback = FeedbackRepository::new(state.pool())
        .list_for_product(id)
        .await?;

    Ok(Json(ProductDetail {
        product,
        retailer,
        category,
        feedback,
    }))
}

/// POST /products
#[instrument(skip(state, current, req))]
pub async fn create(
    State(state): State<AppState>,
    RequireRetailer(current): RequireRetailer,
    ApiJson(req): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let retailer_id = listing_retailer(&state, &current, req.retailer_id).await?;
    let new = req.into_new_product(retailer_id)?;

    let product = ProductRepository::new(state.pool()).create(&new).await?;
    tracing::info!(product_id = %product.id, retailer_id = %retailer_id, "product listed");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /products/{id}
#[instrument(skip(state, current, req))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(req): ApiJson<UpdateProductRequest>,
) -> Result<Json<Product>> {
    load_owned(&state, &current, id).await?;
    let update = req.into_update()?;

    let product = ProductRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(|e| AppError::from_repository(e, "Product not found"))?;
    Ok(Json(product))
}

/// DELETE /products/{id}
#[instrument(skip(state, current))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<StatusCode> {
    load_owned(&state, &current, id).await?;
    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| AppError::from_repository(e, "Product not found"))?;
    Ok(StatusCode::NO_CONTENT)
}
