//! Notification handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use buygenius_core::{NotificationId, UserId};

use crate::db::NotificationRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::Notification;
use crate::services::notifications::notify;
use crate::state::AppState;

/// `?unread=true` filter.
#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread: bool,
}

/// Body for an admin-sent notification.
#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub user_id: UserId,
    pub message: String,
}

/// Result of a bulk update.
#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

/// GET /notifications
#[instrument(skip(state, current))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiQuery(query): ApiQuery<NotificationQuery>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = NotificationRepository::new(state.pool())
        .list_for_user(current.id, query.unread)
        .await?;
    Ok(Json(notifications))
}

/// Send a notification to any user.
///
/// POST /notifications
#[instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiJson(req): ApiJson<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>)> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("Notification message is required".to_string()));
    }

    let notification = notify(state.pool(), state.notifications(), req.user_id, message).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

/// POST /notifications/{id}/read
#[instrument(skip(state, current))]
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<NotificationId>,
) -> Result<Json<Notification>> {
    let notification = NotificationRepository::new(state.pool())
        .mark_read(id, current.id)
        .await
        .map_err(|e| AppError::from_repository(e, "Notification not found"))?;
    Ok(Json(notification))
}

/// POST /notifications/read_all
#[instrument(skip(state, current))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<MarkedRead>> {
    let updated = NotificationRepository::new(state.pool())
        .mark_all_read(current.id)
        .await?;
    Ok(Json(MarkedRead { updated }))
}

/// DELETE /notifications/{id}
#[instrument(skip(state, current))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<NotificationId>,
) -> Result<StatusCode> {
    NotificationRepository::new(state.pool())
        .delete(id, current.id)
        .await
        .map_err(|e| AppError::from_repository(e, "Notification not found"))?;
    Ok(StatusCode::NO_CONTENT)
}
