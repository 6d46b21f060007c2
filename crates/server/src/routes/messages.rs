//! Direct message handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use buygenius_core::{MessageId, ProductId, RetailerId, UserId};

use crate::db::{MessageRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Message, NewMessage};
use crate::services::notifications::notify_best_effort;
use crate::state::AppState;

/// Body for sending a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub receiver_id: UserId,
    pub content: String,
    pub product_id: Option<ProductId>,
    pub retailer_id: Option<RetailerId>,
}

impl SendMessageRequest {
    fn into_new_message(self, sender: &CurrentUser) -> Result<NewMessage> {
        if self.receiver_id == sender.id {
            return Err(AppError::BadRequest(
                "You cannot message yourself".to_string(),
            ));
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(AppError::BadRequest("Message content is required".to_string()));
        }
        Ok(NewMessage {
            sender_id: sender.id,
            receiver_id: self.receiver_id,
            product_id: self.product_id,
            retailer_id: self.retailer_id,
            content: content.to_string(),
        })
    }
}

/// Sent and received messages, newest first.
///
/// GET /messages
#[instrument(skip(state, current))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<Message>>> {
    let messages = MessageRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;
    Ok(Json(messages))
}

/// GET /messages/{id}
#[instrument(skip(state, current))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<MessageId>,
) -> Result<Json<Message>> {
    let message = MessageRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

    if !(current.is_admin || message.involves(current.id)) {
        return Err(AppError::Forbidden(
            "You can only read your own messages".to_string(),
        ));
    }
    Ok(Json(message))
}

/// Send a message and notify the receiver.
///
/// POST /messages
#[instrument(skip(state, current, req))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    let new = req.into_new_message(&current)?;

    UserRepository::new(state.pool())
        .get_by_id(new.receiver_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Receiver not found".to_string()))?;

    let message = MessageRepository::new(state.pool()).create(&new).await?;

    notify_best_effort(
        state.pool(),
        state.notifications(),
        message.receiver_id,
        &format!("New message from {}", current.username),
    )
    .await;

    Ok((StatusCode::CREATED, Json(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> CurrentUser {
        CurrentUser {
            id: UserId::new(3),
            username: "buyer".to_string(),
            is_admin: false,
            is_retailer: false,
        }
    }

    fn request(receiver: i32, content: &str) -> SendMessageRequest {
        SendMessageRequest {
            receiver_id: UserId::new(receiver),
            content: content.to_string(),
            product_id: None,
            retailer_id: None,
        }
    }

    #[test]
    fn test_cannot_message_yourself() {
        assert!(matches!(
            request(3, "hi").into_new_message(&sender()),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_blank_content_is_rejected() {
        assert!(request(4, "  \n").into_new_message(&sender()).is_err());
    }

    #[test]
    fn test_content_is_trimmed() {
        let new = request(4, " Is this still available? ")
            .into_new_message(&sender())
            .ok();
        assert_eq!(
            new.map(|m| m.content).as_deref(),
            Some("Is this still available?")
        );
    }
}
