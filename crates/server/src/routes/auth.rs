//! Authentication route handlers.
//!
//! Signup, login and session inspection. The session cookie is the only
//! credential; handlers here are the only ones that write it.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthService, Signup};
use crate::state::AppState;

/// Signup request body.
///
/// Unknown fields (including a client-supplied `is_admin`) are ignored.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_retailer: bool,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Start a session for `user`.
async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.username.as_str()));
    Ok(())
}

/// Create an account and log it in.
///
/// POST /signup
#[instrument(skip(state, session, req), fields(username = %req.username))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.pool(), state.config())
        .signup(Signup {
            username: &req.username,
            email: &req.email,
            password: &req.password,
            is_retailer: req.is_retailer,
        })
        .await?;

    start_session(&session, &user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in with email and password.
///
/// POST /login
#[instrument(skip(state, session, req))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool(), state.config())
        .login(&req.email, &req.password)
        .await?;

    start_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(user))
}

/// Log out, keeping the rest of the session.
///
/// DELETE /logout
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// Report the logged-in user, re-read from the database.
///
/// GET /check_session
///
/// Returns 204 when nobody is logged in or the account no longer exists.
/// `OptionalAuth` has already refreshed or cleared the session by now.
#[instrument(skip(state, session, current))]
pub async fn check_session(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
) -> Result<Response> {
    let Some(current) = current else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    match UserRepository::new(state.pool()).get_by_id(current.id).await? {
        Some(user) => Ok(Json(user).into_response()),
        None => {
            clear_current_user(&session).await?;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

/// Drop the whole session, cookie included.
///
/// DELETE /clear_session
pub async fn clear_session(session: Session) -> Result<StatusCode> {
    session.flush().await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
