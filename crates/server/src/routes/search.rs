//! Product search and search history.
//!
//! Matches are ranked best value first; see [`buygenius_core::ranking`].

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use buygenius_core::ranking::{Ranked, rank};

use crate::db::{ProductRepository, SearchHistoryRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiQuery;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Product, SearchHistoryEntry};
use crate::state::AppState;

/// Longest accepted search term, in characters.
const MAX_TERM_CHARS: usize = 200;

/// `?q=` parameter.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    /// Trimmed, non-blank term that `PostgreSQL` can store.
    fn term(&self) -> Result<&str> {
        let term = self.q.as_deref().map(str::trim).unwrap_or_default();
        if term.is_empty() {
            return Err(AppError::BadRequest("Search term is required".to_string()));
        }
        if term.chars().count() > MAX_TERM_CHARS {
            return Err(AppError::BadRequest(format!(
                "Search term must be at most {MAX_TERM_CHARS} characters"
            )));
        }
        if term.contains('\0') {
            return Err(AppError::BadRequest(
                "Search term must not contain NUL characters".to_string(),
            ));
        }
        Ok(term)
    }
}

/// Search products by name or description.
///
/// GET /search?q=term
#[instrument(skip(state, current))]
pub async fn search(
    State(state): State<AppState>,
    OptionalAuth(current): OptionalAuth,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<Ranked<Product>>>> {
    let term = query.term()?;
    let matches = ProductRepository::new(state.pool()).search(term).await?;

    if let Some(user) = current {
        if let Err(e) = SearchHistoryRepository::new(state.pool())
            .record(user.id, term)
            .await
        {
            tracing::warn!(user_id = %user.id, error = %e, "failed to record search");
        }
    }

    tracing::debug!(term, matches = matches.len(), "search");
    Ok(Json(rank(matches)))
}

/// GET /search/history
#[instrument(skip(state, current))]
pub async fn history(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<SearchHistoryEntry>>> {
    let entries = SearchHistoryRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;
    Ok(Json(entries))
}

/// DELETE /search/history
#[instrument(skip(state, current))]
pub async fn clear_history(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<StatusCode> {
    SearchHistoryRepository::new(state.pool())
        .clear(current.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(q: Option<&str>) -> SearchQuery {
        SearchQuery {
            q: q.map(str::to_string),
        }
    }

    #[test]
    fn test_term_is_trimmed() {
        assert_eq!(query(Some("  iphone 14 ")).term().ok(), Some("iphone 14"));
    }

    #[test]
    fn test_blank_or_missing_term_is_rejected() {
        assert!(query(None).term().is_err());
        assert!(query(Some("   ")).term().is_err());
    }

    #[test]
    fn test_overlong_term_is_rejected() {
        let long = "a".repeat(MAX_TERM_CHARS + 1);
        assert!(query(Some(&long)).term().is_err());
    }

    #[test]
    fn test_nul_in_term_is_rejected() {
        assert!(matches!(
            query(Some("phone\0")).term(),
            Err(AppError::BadRequest(msg)) if msg.contains("NUL")
        ));
    }
}
