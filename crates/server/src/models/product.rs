//! Product domain types.

use buygenius_core::ranking::{Offer, RankInput};
use buygenius_core::{CategoryId, ProductId, RetailerId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Category, Feedback, Retailer};

/// An offer listed by a retailer.
///
/// Money and benefit figures are exact decimals in storage and plain JSON
/// numbers on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_cost: Decimal,
    pub payment_mode: Option<String>,
    pub retailer_id: RetailerId,
    pub category_id: CategoryId,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub estimated_value: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub marginal_benefit: Option<Decimal>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Offer for Product {
    fn offer_id(&self) -> ProductId {
        self.id
    }

    fn rank_input(&self) -> RankInput {
        RankInput {
            price: self.price,
            delivery_cost: self.delivery_cost,
            estimated_value: self.estimated_value,
            marginal_benefit: self.marginal_benefit,
        }
    }
}

/// Input for listing a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub delivery_cost: Decimal,
    pub payment_mode: Option<String>,
    pub retailer_id: RetailerId,
    pub category_id: CategoryId,
    pub estimated_value: Option<Decimal>,
    pub marginal_benefit: Option<Decimal>,
    pub image_url: Option<String>,
}

/// Changes to a product. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
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

/// Optional listing filters, taken from the query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub retailer_id: Option<RetailerId>,
}

/// A product with everything its detail page shows.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub retailer: Retailer,
    pub category: Category,
    pub feedback: Vec<Feedback>,
}
