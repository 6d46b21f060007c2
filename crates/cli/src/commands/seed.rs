//! Seed the marketplace with sample data.
//!
//! Loads three categories, an admin account, five approved retailers and
//! the same products listed by several of them at different prices, so
//! the cost-benefit ranking has something to compare.
//!
//! ```bash
//! bg-cli seed           # refuses if users already exist
//! bg-cli seed --reset   # truncates marketplace tables first
//! ```
//!
//! Seeded accounts: `admin@buygenius.com` / `admin123` and
//! `vendor1@example.com` .. `vendor5@example.com` / `vendor123`.

use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use buygenius_server::services::auth::hash_password;

use super::{CommandError, connect};

const CATEGORIES: &[&str] = &["Electronics", "Fashion", "Home & Kitchen"];

const ADMIN: (&str, &str, &str) = ("admin", "admin@buygenius.com", "admin123");

const VENDOR_PASSWORD: &str = "vendor123";

/// Retailer name and WhatsApp number, owned by `vendor1`..`vendor5` in order.
const VENDORS: &[(&str, &str)] = &[
    ("Naivas Supermarket", "+254712345678"),
    ("Jumia Kenya", "+254712345679"),
    ("Amazon Global", "+15417543010"),
    ("Kilimall Kenya", "+254712345680"),
    ("Souq UAE", "+971501234567"),
];

const PAYMENT_MODE: &str = "Cash/Card/M-Pesa";

/// One retailer's listing of a sample product.
struct Variant {
    retailer: &'static str,
    price: i64,
    delivery_cost: i64,
    estimated_value: i64,
    /// Marginal benefit in hundredths.
    marginal_benefit: i64,
}

struct SampleProduct {
    name: &'static str,
    category: &'static str,
    variants: &'static [Variant],
}

const fn variant(
    retailer: &'static str,
    price: i64,
    delivery_cost: i64,
    estimated_value: i64,
    marginal_benefit: i64,
) -> Variant {
    Variant {
        retailer,
        price,
        delivery_cost,
        estimated_value,
        marginal_benefit,
    }
}

const PRODUCTS: &[SampleProduct] = &[
    SampleProduct {
        name: "Samsung Galaxy S23",
        category: "Electronics",
        variants: &[
            variant("Jumia Kenya", 115_000, 500, 125_000, 15),
            variant("Amazon Global", 120_000, 0, 130_000, 12),
            variant("Kilimall Kenya", 110_000, 1_000, 120_000, 10),
            variant("Souq UAE", 125_000, 800, 135_000, 8),
        ],
    },
    SampleProduct {
        name: "HP EliteBook 840",
        category: "Electronics",
        variants: &[
            variant("Naivas Supermarket", 95_000, 1_500, 105_000, 12),
            variant("Jumia Kenya", 89_000, 2_000, 98_000, 10),
            variant("Amazon Global", 110_000, 0, 120_000, 9),
        ],
    },
    SampleProduct {
        name: "Levi's 501 Original Fit",
        category: "Fashion",
        variants: &[
            variant("Naivas Supermarket", 4_500, 300, 5_000, 5),
            variant("Kilimall Kenya", 5_000, 0, 5_500, 10),
            variant("Souq UAE", 4_800, 500, 5_300, 4),
        ],
    },
];

/// Seed the database.
///
/// Everything is written in one transaction.
///
/// # Errors
///
/// Returns `CommandError::AlreadySeeded` if users exist and `reset` is false,
/// or any database error.
pub async fn run(reset: bool) -> Result<(), CommandError> {
    let admin_hash = hash_password(ADMIN.2)?;
    let vendor_hash = hash_password(VENDOR_PASSWORD)?;

    let pool = connect().await?;
    let mut tx = pool.begin().await?;

    if reset {
        tracing::warn!("Removing existing marketplace data");
        sqlx::query(
            "TRUNCATE marketplace.users, marketplace.categories RESTART IDENTITY CASCADE",
        )
        .execute(&mut *tx)
        .await?;
    } else {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM marketplace.users")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Err(CommandError::AlreadySeeded);
        }
    }

    for name in CATEGORIES {
        sqlx::query("INSERT INTO marketplace.categories (name) VALUES ($1)")
            .bind(*name)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query(
        r"
        INSERT INTO marketplace.users (username, email, password_hash, is_admin)
        VALUES ($1, $2, $3, TRUE)
        ",
    )
    .bind(ADMIN.0)
    .bind(ADMIN.1)
    .bind(&admin_hash)
    .execute(&mut *tx)
    .await?;

    for (number, (name, whatsapp)) in (1..).zip(VENDORS) {
        insert_vendor(&mut tx, number, name, whatsapp, &vendor_hash).await?;
    }

    let mut listed = 0_usize;
    for product in PRODUCTS {
        for v in product.variants {
            insert_listing(&mut tx, product, v).await?;
            listed += 1;
        }
    }

    tx.commit().await?;

    tracing::info!("Database seeded successfully!");
    tracing::info!("  Categories: {}", CATEGORIES.len());
    tracing::info!("  Retailers: {}", VENDORS.len());
    tracing::info!("  Product listings: {listed}");
    Ok(())
}

async fn insert_vendor(
    tx: &mut Transaction<'_, Postgres>,
    number: u32,
    name: &str,
    whatsapp: &str,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    let user_id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO marketplace.users (username, email, password_hash, is_retailer)
        VALUES ($1, $2, $3, TRUE)
        RETURNING id
        ",
    )
    .bind(format!("vendor{number}"))
    .bind(format!("vendor{number}@example.com"))
    .bind(password_hash)
    .fetch_one(&mut **tx)
    .await?;

    sqlx::query(
        r"
        INSERT INTO marketplace.retailers (name, user_id, whatsapp_number, approved)
        VALUES ($1, $2, $3, TRUE)
        ",
    )
    .bind(name)
    .bind(user_id)
    .bind(whatsapp)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_listing(
    tx: &mut Transaction<'_, Postgres>,
    product: &SampleProduct,
    v: &Variant,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO marketplace.products
            (name, price, description, delivery_cost, payment_mode, retailer_id,
             category_id, estimated_value, marginal_benefit, image_url)
        VALUES (
            $1, $2, $3, $4, $5,
            (SELECT id FROM marketplace.retailers WHERE name = $6),
            (SELECT id FROM marketplace.categories WHERE name = $7),
            $8, $9, $10
        )
        ",
    )
    .bind(product.name)
    .bind(Decimal::from(v.price))
    .bind(format!("Brand new {} from {}", product.name, v.retailer))
    .bind(Decimal::from(v.delivery_cost))
    .bind(PAYMENT_MODE)
    .bind(v.retailer)
    .bind(product.category)
    .bind(Decimal::from(v.estimated_value))
    .bind(Decimal::new(v.marginal_benefit, 2))
    .bind(image_url(product.name))
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn image_url(product_name: &str) -> String {
    format!(
        "https://example.com/images/{}.jpg",
        product_name.replace(' ', "-").to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url_slug() {
        assert_eq!(
            image_url("HP EliteBook 840"),
            "https://example.com/images/hp-elitebook-840.jpg"
        );
    }

    #[test]
    fn test_listings_reference_known_rows() {
        for product in PRODUCTS {
            assert!(CATEGORIES.contains(&product.category), "{}", product.name);
            for v in product.variants {
                assert!(
                    VENDORS.iter().any(|(name, _)| *name == v.retailer),
                    "{} sold by unknown {}",
                    product.name,
                    v.retailer
                );
            }
        }
    }

    #[test]
    fn test_seed_passwords_meet_minimum() {
        assert!(buygenius_server::services::auth::validate_password(ADMIN.2).is_ok());
        assert!(buygenius_server::services::auth::validate_password(VENDOR_PASSWORD).is_ok());
    }

    #[test]
    fn test_marginal_benefit_scale() {
        assert_eq!(Decimal::new(15, 2).to_string(), "0.15");
    }
}
