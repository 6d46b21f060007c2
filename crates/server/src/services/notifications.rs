//! Notification delivery.
//!
//! Notifications are written to the database and then published on an
//! in-process broadcast channel so open websocket connections can push them
//! immediately.

use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::broadcast;

use buygenius_core::UserId;

use crate::db::{NotificationRepository, RepositoryError};
use crate::models::Notification;

/// Events buffered per subscriber before it starts lagging.
pub const HUB_CAPACITY: usize = 256;

/// A freshly stored notification.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationEvent {
    pub user_id: UserId,
    pub notification: Notification,
}

/// Fan-out point for new notifications.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    sender: broadcast::Sender<NotificationEvent>,
}

impl NotificationHub {
    /// Create a hub with [`HUB_CAPACITY`] slots.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(HUB_CAPACITY);
        Self { sender }
    }

    /// Listen for every event; callers filter by user.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no listeners is fine.
    pub fn publish(&self, event: NotificationEvent) {
        let listeners = self.sender.send(event).unwrap_or(0);
        tracing::trace!(listeners, "notification published");
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Store a notification for `user_id` and publish it.
///
/// # Errors
///
/// Returns `RepositoryError` if the notification cannot be stored.
pub async fn notify(
    pool: &PgPool,
    hub: &NotificationHub,
    user_id: UserId,
    message: &str,
) -> Result<Notification, RepositoryError> {
    let notification = NotificationRepository::new(pool)
        .create(user_id, message)
        .await?;

    hub.publish(NotificationEvent {
        user_id,
        notification: notification.clone(),
    });

    Ok(notification)
}

/// Like [`notify`], but a failure is only logged.
///
/// Used where the notification is a side effect of a write that has already
/// succeeded.
pub async fn notify_best_effort(pool: &PgPool, hub: &NotificationHub, user_id: UserId, message: &str) {
    if let Err(e) = notify(pool, hub, user_id, message).await {
        tracing::warn!(user_id = %user_id, error = %e, "failed to store notification");
    }
}
