//! Product feedback handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use buygenius_core::{FeedbackId, ProductId};

use crate::db::{FeedbackRepository, ProductRepository, RetailerRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::{Feedback, NewFeedback, Product};
use crate::services::notifications::notify_best_effort;
use crate::state::AppState;

/// Feedback body. At least one of the two must be present.
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackRequest {
    pub comment: Option<String>,
    pub rating: Option<i16>,
}

impl FeedbackRequest {
    /// Normalized comment and rating.
    fn validate(self) -> Result<(Option<String>, Option<i16>)> {
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                return Err(AppError::BadRequest(
                    "Rating must be between 1 and 5".to_string(),
                ));
            }
        }

        let comment = self
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if comment.is_none() && self.rating.is_none() {
            return Err(AppError::BadRequest(
                "Feedback needs a comment or a rating".to_string(),
            ));
        }
        Ok((comment, self.rating))
    }
}

async fn load_product(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// GET /products/{id}/feedback
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<Json<Vec<Feedback>>> {
    load_product(&state, product_id).await?;
    let feedback = FeedbackRepository::new(state.pool())
        .list_for_product(product_id)
        .await?;
    Ok(Json(feedback))
}

/// Leave feedback and let the seller know.
///
/// POST /products/{id}/feedback
#[instrument(skip(state, current, req))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(product_id): ApiPath<ProductId>,
    ApiJson(req): ApiJson<FeedbackRequest>,
) -> Result<(StatusCode, Json<Feedback>)> {
    let (comment, rating) = req.validate()?;
    let product = load_product(&state, product_id).await?;

    let feedback = FeedbackRepository::new(state.pool())
        .create(&NewFeedback {
            user_id: current.id,
            product_id,
            comment,
            rating,
        })
        .await?;

    let seller = RetailerRepository::new(state.pool())
        .get_by_id(product.retailer_id)
        .await?;
    if let Some(seller) = seller.filter(|r| r.user_id != current.id) {
        notify_best_effort(
            state.pool(),
            state.notifications(),
            seller.user_id,
            &format!("{} left feedback on {}", current.username, product.name),
        )
        .await;
    }

    Ok((StatusCode::CREATED, Json(feedback)))
}

/// DELETE /feedback/{id}
#[instrument(skip(state, current))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<FeedbackId>,
) -> Result<StatusCode> {
    let repo = FeedbackRepository::new(state.pool());
    let feedback = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Feedback not found".to_string()))?;

    if !current.owns_or_admin(feedback.user_id) {
        return Err(AppError::Forbidden(
            "You can only delete your own feedback".to_string(),
        ));
    }

    repo.delete(id)
        .await
        .map_err(|e| AppError::from_repository(e, "Feedback not found"))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        for rating in [0, 6, -1] {
            let req = FeedbackRequest {
                comment: Some("ok".to_string()),
                rating: Some(rating),
            };
            assert!(req.validate().is_err(), "rating {rating} accepted");
        }
        for rating in 1..=5 {
            let req = FeedbackRequest {
                comment: None,
                rating: Some(rating),
            };
            assert!(req.validate().is_ok());
        }
    }

    #[test]
    fn test_blank_comment_without_rating_is_rejected() {
        let req = FeedbackRequest {
            comment: Some("   ".to_string()),
            rating: None,
        };
        assert!(matches!(req.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_comment_is_trimmed() {
        let req = FeedbackRequest {
            comment: Some("  Fast delivery ".to_string()),
            rating: Some(4),
        };
        let (comment, rating) = req.validate().unwrap_or_default();
        assert_eq!(comment.as_deref(), Some("Fast delivery"));
        assert_eq!(rating, Some(4));
    }
}
