//! Authentication extractors.
//!
//! Authorization is expressed in handler signatures: take `RequireAuth`,
//! `RequireRetailer` or `RequireAdmin` and the handler only runs for a
//! suitable session. Rejections are JSON error bodies.
//!
//! The session only remembers who logged in. Every extraction reloads the
//! account, so a deleted user is logged out and a promotion or demotion
//! takes effect on that user's next request.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::models::{CurrentUser, User, session_keys};
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires an admin.
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that requires a retailer account (admins pass too).
pub struct RequireRetailer(pub CurrentUser);

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this never rejects on a missing login. It still
/// fails when the account cannot be checked.
pub struct OptionalAuth(pub Option<CurrentUser>);

/// Why an authorization extractor refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No user in the session.
    Unauthorized,
    /// Logged in, but without the required role.
    Forbidden(&'static str),
    /// The account could not be reloaded.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            Self::Unavailable => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// What the stored account says about a session's cached identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reconciled {
    /// The account no longer exists.
    Gone,
    /// The cached identity still matches.
    Current,
    /// Username or role flags changed since the session was written.
    Changed(CurrentUser),
}

/// Compare a session's cached identity with the stored account.
pub(crate) fn reconcile(cached: &CurrentUser, stored: Option<&User>) -> Reconciled {
    let Some(stored) = stored else {
        return Reconciled::Gone;
    };
    let fresh = CurrentUser::from(stored);
    if &fresh == cached {
        Reconciled::Current
    } else {
        Reconciled::Changed(fresh)
    }
}

pub(crate) fn require_admin(user: CurrentUser) -> Result<CurrentUser, AuthRejection> {
    if user.is_admin {
        Ok(user)
    } else {
        Err(AuthRejection::Forbidden("Admin access required"))
    }
}

pub(crate) fn require_retailer(user: CurrentUser) -> Result<CurrentUser, AuthRejection> {
    if user.is_retailer || user.is_admin {
        Ok(user)
    } else {
        Err(AuthRejection::Forbidden("Retailer access required"))
    }
}

/// Resolve the request's user against the database.
///
/// A session pointing at a deleted account is cleared and treated as
/// anonymous. Changed role flags are written back to the session.
async fn current_user(
    parts: &Parts,
    state: &AppState,
) -> Result<Option<CurrentUser>, AuthRejection> {
    // Session is set in extensions by SessionManagerLayer
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };
    let cached = match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(None),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read session");
            return Ok(None);
        }
    };

    let stored = UserRepository::new(state.pool())
        .get_by_id(cached.id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %cached.id, "failed to reload session user");
            AuthRejection::Unavailable
        })?;

    match reconcile(&cached, stored.as_ref()) {
        Reconciled::Current => Ok(Some(cached)),
        Reconciled::Changed(fresh) => {
            if let Err(e) = refresh_current_user(session, &fresh).await {
                tracing::warn!(error = %e, "failed to refresh session user");
            }
            Ok(Some(fresh))
        }
        Reconciled::Gone => {
            tracing::info!(user_id = %cached.id, "session user no longer exists");
            if let Err(e) = session.flush().await {
                tracing::warn!(error = %e, "failed to flush stale session");
            }
            Ok(None)
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        current_user(parts, &state)
            .await?
            .map(Self)
            .ok_or(AuthRejection::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let user = current_user(parts, &state)
            .await?
            .ok_or(AuthRejection::Unauthorized)?;
        require_admin(user).map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireRetailer
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let user = current_user(parts, &state)
            .await?
            .ok_or(AuthRejection::Unauthorized)?;
        require_retailer(user).map(Self)
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        current_user(parts, &state).await.map(Self)
    }
}

/// Helper to set the current user in the session.
///
/// Cycles the session id first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to refresh the cached user without cycling the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn refresh_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use buygenius_core::{Email, UserId, Username};
    use chrono::Utc;

    use super::*;

    fn stored(is_admin: bool, is_retailer: bool) -> User {
        User {
            id: UserId::new(7),
            username: Username::parse("shopper").unwrap(),
            email: Email::parse("shopper@example.com").unwrap(),
            is_retailer,
            is_admin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_deleted_account_is_gone() {
        let cached = CurrentUser::from(&stored(true, false));
        assert_eq!(reconcile(&cached, None), Reconciled::Gone);
    }

    #[test]
    fn test_unchanged_account_is_current() {
        let user = stored(false, true);
        let cached = CurrentUser::from(&user);
        assert_eq!(reconcile(&cached, Some(&user)), Reconciled::Current);
    }

    #[test]
    fn test_promotion_reaches_cached_session() {
        let cached = CurrentUser::from(&stored(false, false));
        let promoted = stored(true, false);

        let Reconciled::Changed(fresh) = reconcile(&cached, Some(&promoted)) else {
            panic!("promotion should change the session user");
        };
        assert!(fresh.is_admin);
        assert!(require_admin(fresh).is_ok());
    }

    #[test]
    fn test_demotion_revokes_admin_access() {
        let cached = CurrentUser::from(&stored(true, false));
        let demoted = stored(false, false);

        let Reconciled::Changed(fresh) = reconcile(&cached, Some(&demoted)) else {
            panic!("demotion should change the session user");
        };
        assert_eq!(
            require_admin(fresh),
            Err(AuthRejection::Forbidden("Admin access required"))
        );
    }

    #[test]
    fn test_role_gates() {
        let customer = CurrentUser::from(&stored(false, false));
        let retailer = CurrentUser::from(&stored(false, true));
        let admin = CurrentUser::from(&stored(true, false));

        assert!(require_admin(customer.clone()).is_err());
        assert!(require_admin(retailer.clone()).is_err());
        assert!(require_admin(admin.clone()).is_ok());

        assert_eq!(
            require_retailer(customer),
            Err(AuthRejection::Forbidden("Retailer access required"))
        );
        assert!(require_retailer(retailer).is_ok());
        assert!(require_retailer(admin).is_ok());
    }

    #[test]
    fn test_unavailable_is_a_server_error() {
        let response = AuthRejection::Unavailable.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
