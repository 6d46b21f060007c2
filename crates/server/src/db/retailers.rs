//! Retailer repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use buygenius_core::{RetailerId, UserId};

use super::{RepositoryError, write_error};
use crate::models::{NewRetailer, Retailer, RetailerUpdate};

const RETAILER_CONFLICTS: &[(&str, &str)] =
    &[("retailers_user_id_key", "User already has a retailer")];

const RETAILER_COLUMNS: &str = "id, name, user_id, whatsapp_number, approved, created_at";

#[derive(sqlx::FromRow)]
struct RetailerRow {
    id: i32,
    name: String,
    user_id: i32,
    whatsapp_number: Option<String>,
    approved: bool,
    created_at: DateTime<Utc>,
}

impl From<RetailerRow> for Retailer {
    fn from(r: RetailerRow) -> Self {
        Self {
            id: RetailerId::new(r.id),
            name: r.name,
            user_id: UserId::new(r.user_id),
            whatsapp_number: r.whatsapp_number,
            approved: r.approved,
            created_at: r.created_at,
        }
    }
}

/// Repository for retailer database operations.
pub struct RetailerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RetailerRepository<'a> {
    /// Create a new retailer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List retailers, optionally only approved or only pending ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, approved: Option<bool>) -> Result<Vec<Retailer>, RepositoryError> {
        let rows = sqlx::query_as::<_, RetailerRow>(&format!(
            r"
            SELECT {RETAILER_COLUMNS}
            FROM marketplace.retailers
            WHERE $1::BOOLEAN IS NULL OR approved = $1
            ORDER BY id
            "
        ))
        .bind(approved)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Retailer::from).collect())
    }

    /// Get a retailer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: RetailerId) -> Result<Option<Retailer>, RepositoryError> {
        let row = sqlx::query_as::<_, RetailerRow>(&format!(
            "SELECT {RETAILER_COLUMNS} FROM marketplace.retailers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Retailer::from))
    }

    /// Get the retailer owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Retailer>, RepositoryError> {
        let row = sqlx::query_as::<_, RetailerRow>(&format!(
            "SELECT {RETAILER_COLUMNS} FROM marketplace.retailers WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Retailer::from))
    }

    /// Create a retailer and flag its owner as a retailer account.
    ///
    /// Both writes happen in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already owns a retailer.
    /// Returns `RepositoryError::InvalidReference` if the user does not exist.
    pub async fn create(&self, new: &NewRetailer) -> Result<Retailer, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RetailerRow>(&format!(
            r"
            INSERT INTO marketplace.retailers (name, user_id, whatsapp_number)
            VALUES ($1, $2, $3)
            RETURNING {RETAILER_COLUMNS}
            "
        ))
        .bind(&new.name)
        .bind(new.user_id)
        .bind(new.whatsapp_number.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, RETAILER_CONFLICTS))?;

        sqlx::query("UPDATE marketplace.users SET is_retailer = TRUE WHERE id = $1")
            .bind(new.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Retailer::from(row))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the retailer does not exist.
    pub async fn update(
        &self,
        id: RetailerId,
        update: &RetailerUpdate,
    ) -> Result<Retailer, RepositoryError> {
        let row = sqlx::query_as::<_, RetailerRow>(&format!(
            r"
            UPDATE marketplace.retailers
            SET name = COALESCE($2, name),
                whatsapp_number = COALESCE($3, whatsapp_number)
            WHERE id = $1
            RETURNING {RETAILER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.whatsapp_number.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Retailer::from(row))
    }

    /// Mark a retailer as approved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the retailer does not exist.
    pub async fn approve(&self, id: RetailerId) -> Result<Retailer, RepositoryError> {
        let row = sqlx::query_as::<_, RetailerRow>(&format!(
            "UPDATE marketplace.retailers SET approved = TRUE WHERE id = $1 RETURNING {RETAILER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Retailer::from(row))
    }

    /// Delete a retailer and clear its owner's retailer flag.
    ///
    /// Products listed by the retailer cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the retailer does not exist.
    pub async fn delete(&self, id: RetailerId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let owner: Option<i32> =
            sqlx::query_scalar("DELETE FROM marketplace.retailers WHERE id = $1 RETURNING user_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let owner = owner.ok_or(RepositoryError::NotFound)?;

        sqlx::query("UPDATE marketplace.users SET is_retailer = FALSE WHERE id = $1")
            .bind(owner)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
