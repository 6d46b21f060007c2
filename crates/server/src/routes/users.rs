//! User account handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use buygenius_core::{Email, UserId, Username};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{RequireAdmin, RequireAuth, refresh_current_user};
use crate::models::{CurrentUser, User, UserUpdate};
use crate::services::auth::{AuthError, hash_password, validate_password};
use crate::state::AppState;

/// Partial account update. Role flags are admin-only.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_retailer: Option<bool>,
    pub is_admin: Option<bool>,
}

fn ensure_self_or_admin(current: &CurrentUser, id: UserId) -> Result<()> {
    if current.owns_or_admin(id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You can only manage your own account".to_string(),
        ))
    }
}

/// Turn a request into a validated update.
fn build_update(current: &CurrentUser, req: UpdateUserRequest) -> Result<UserUpdate> {
    if (req.is_admin.is_some() || req.is_retailer.is_some()) && !current.is_admin {
        return Err(AppError::Forbidden(
            "Only admins can change account roles".to_string(),
        ));
    }

    let username = req
        .username
        .as_deref()
        .map(Username::parse)
        .transpose()
        .map_err(AuthError::from)?;
    let email = req
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(AuthError::from)?;
    let password_hash = match req.password.as_deref() {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let update = UserUpdate {
        username,
        email,
        password_hash,
        is_retailer: req.is_retailer,
        is_admin: req.is_admin,
    };
    if update.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }
    Ok(update)
}

/// List all users.
///
/// GET /users
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users))
}

/// Show one user.
///
/// GET /users/{id}
#[instrument(skip(state, current))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<User>> {
    ensure_self_or_admin(&current, id)?;
    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

/// Update a user.
///
/// PUT /users/{id}
#[instrument(skip(state, session, current, req))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>> {
    ensure_self_or_admin(&current, id)?;
    let update = build_update(&current, req)?;

    let user = UserRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(|e| AppError::from_repository(e, "User not found"))?;

    if user.id == current.id {
        refresh_current_user(&session, &CurrentUser::from(&user)).await?;
    }
    Ok(Json(user))
}

/// Delete a user. Deleting yourself ends your session.
///
/// DELETE /users/{id}
#[instrument(skip(state, session, current))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<UserId>,
) -> Result<StatusCode> {
    ensure_self_or_admin(&current, id)?;

    UserRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| AppError::from_repository(e, "User not found"))?;

    if id == current.id {
        session.flush().await?;
    }
    tracing::info!(user_id = %id, deleted_by = %current.id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
