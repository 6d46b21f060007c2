//! Product repository, including the text search behind `/search`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use buygenius_core::{CategoryId, ProductId, RetailerId};

use super::{RepositoryError, write_error};
use crate::models::{NewProduct, Product, ProductFilter, ProductUpdate};

pub(super) const PRODUCT_COLUMNS: &str = "p.id, p.name, p.price, p.description, p.delivery_cost, \
     p.payment_mode, p.retailer_id, p.category_id, p.estimated_value, p.marginal_benefit, \
     p.image_url, p.created_at";

#[derive(sqlx::FromRow)]
pub(super) struct ProductRow {
    id: i32,
    name: String,
    price: Decimal,
    description: Option<String>,
    delivery_cost: Decimal,
    payment_mode: Option<String>,
    retailer_id: i32,
    category_id: i32,
    estimated_value: Option<Decimal>,
    marginal_benefit: Option<Decimal>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: ProductId::new(r.id),
            name: r.name,
            price: r.price,
            description: r.description,
            delivery_cost: r.delivery_cost,
            payment_mode: r.payment_mode,
            retailer_id: RetailerId::new(r.retailer_id),
            category_id: CategoryId::new(r.category_id),
            estimated_value: r.estimated_value,
            marginal_benefit: r.marginal_benefit,
            image_url: r.image_url,
            created_at: r.created_at,
        }
    }
}

/// Build an `ILIKE` pattern matching `term` anywhere, with its own
/// wildcards escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, optionally narrowed to a category and/or retailer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM marketplace.products p
            WHERE ($1::INTEGER IS NULL OR p.category_id = $1)
              AND ($2::INTEGER IS NULL OR p.retailer_id = $2)
            ORDER BY p.id
            "
        ))
        .bind(filter.category_id)
        .bind(filter.retailer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM marketplace.products p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Products whose name or description contains `term`, ignoring case.
    ///
    /// Results come back in id order; ranking happens in the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, term: &str) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM marketplace.products p
            WHERE p.name ILIKE $1 OR p.description ILIKE $1
            ORDER BY p.id
            "
        ))
        .bind(contains_pattern(term))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// List a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` for an unknown retailer or category.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            WITH p AS (
                INSERT INTO marketplace.products
                    (name, price, description, delivery_cost, payment_mode, retailer_id,
                     category_id, estimated_value, marginal_benefit, image_url)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
            )
            SELECT {PRODUCT_COLUMNS} FROM p
            "
        ))
        .bind(&new.name)
        .bind(new.price)
        .bind(new.description.as_deref())
        .bind(new.delivery_cost)
        .bind(new.payment_mode.as_deref())
        .bind(new.retailer_id)
        .bind(new.category_id)
        .bind(new.estimated_value)
        .bind(new.marginal_benefit)
        .bind(new.image_url.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| write_error(e, &[]))?;

        Ok(Product::from(row))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::InvalidReference` for an unknown category.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            WITH p AS (
                UPDATE marketplace.products
                SET name = COALESCE($2, name),
                    price = COALESCE($3, price),
                    description = COALESCE($4, description),
                    delivery_cost = COALESCE($5, delivery_cost),
                    payment_mode = COALESCE($6, payment_mode),
                    category_id = COALESCE($7, category_id),
                    estimated_value = COALESCE($8, estimated_value),
                    marginal_benefit = COALESCE($9, marginal_benefit),
                    image_url = COALESCE($10, image_url)
                WHERE id = $1
                RETURNING *
            )
            SELECT {PRODUCT_COLUMNS} FROM p
            "
        ))
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.price)
        .bind(update.description.as_deref())
        .bind(update.delivery_cost)
        .bind(update.payment_mode.as_deref())
        .bind(update.category_id)
        .bind(update.estimated_value)
        .bind(update.marginal_benefit)
        .bind(update.image_url.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| write_error(e, &[]))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Product::from(row))
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM marketplace.products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
