//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                             - Welcome text
//! GET    /health                       - Liveness
//! GET    /health/ready                 - Readiness (database reachable)
//!
//! # Auth
//! POST   /signup                       - Create account, start session
//! POST   /login                        - Start session
//! DELETE /logout                       - End login, keep session
//! GET    /check_session                - Current user (204 when anonymous)
//! DELETE /clear_session                - Drop the session
//!
//! # Users
//! GET    /users                        - All users (admin)
//! GET    /users/{id}                   - One user (self or admin)
//! PUT    /users/{id}                   - Update (self or admin)
//! DELETE /users/{id}                   - Delete (self or admin)
//!
//! # Retailers
//! GET    /retailers                    - List (?approved=)
//! POST   /retailers                    - Register a retailer
//! GET    /retailers/{id}               - One retailer
//! PUT    /retailers/{id}               - Update (owner or admin)
//! DELETE /retailers/{id}               - Delete (owner or admin)
//! POST   /retailers/{id}/approve       - Approve (admin)
//! GET    /retailers/{id}/products      - Its products
//!
//! # Categories
//! GET    /categories                   - List
//! POST   /categories                   - Create (admin)
//! GET    /categories/{id}              - One category
//! PUT    /categories/{id}              - Rename (admin)
//! DELETE /categories/{id}              - Delete (admin)
//! GET    /categories/{id}/products     - Its products
//!
//! # Products and feedback
//! GET    /products                     - List (?category_id=&retailer_id=)
//! POST   /products                     - List a product (approved retailer or admin)
//! GET    /products/{id}                - Detail with retailer, category, feedback
//! PUT    /products/{id}                - Update (owning retailer or admin)
//! DELETE /products/{id}                - Delete (owning retailer or admin)
//! GET    /products/{id}/feedback       - Feedback on a product
//! POST   /products/{id}/feedback       - Leave feedback
//! DELETE /feedback/{id}                - Delete (author or admin)
//!
//! # Per-user records
//! GET    /wishlist                     - Own wishlist
//! POST   /wishlist                     - Save a product
//! DELETE /wishlist/{id}                - Remove
//! GET    /messages                     - Sent and received
//! POST   /messages                     - Send
//! GET    /messages/{id}                - One message (participant or admin)
//! GET    /notifications                - Own notifications (?unread=true)
//! POST   /notifications                - Send (admin)
//! POST   /notifications/read_all       - Mark all read
//! POST   /notifications/{id}/read      - Mark one read
//! DELETE /notifications/{id}           - Delete
//!
//! # Search
//! GET    /search?q=                    - Ranked product search
//! GET    /search/history               - Own search history
//! DELETE /search/history               - Clear it
//!
//! # Dashboards
//! GET    /dashboard/admin              - Marketplace counts (admin)
//! GET    /dashboard/retailer           - Own retailer summary (retailer)
//!
//! # Realtime
//! GET    /ws                           - Websocket (acks, pushed notifications)
//! ```

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod feedback;
pub mod messages;
pub mod notifications;
pub mod products;
pub mod retailers;
pub mod search;
pub mod users;
pub mod wishlist;
pub mod ws;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Signup and login, kept apart so they can carry a rate limiter.
pub fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
}

/// Everything except the credential endpoints.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Session
        .route("/logout", delete(auth::logout))
        .route("/check_session", get(auth::check_session))
        .route("/clear_session", delete(auth::clear_session))
        // Users
        .route("/users", get(users::list))
        .route(
            "/users/{id}",
            get(users::show).put(users::update).delete(users::delete),
        )
        // Retailers
        .route("/retailers", get(retailers::list).post(retailers::create))
        .route(
            "/retailers/{id}",
            get(retailers::show)
                .put(retailers::update)
                .delete(retailers::delete),
        )
        .route("/retailers/{id}/approve", post(retailers::approve))
        .route("/retailers/{id}/products", get(retailers::products))
        // Categories
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/categories/{id}/products", get(categories::products))
        // Products and feedback
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route(
            "/products/{id}/feedback",
            get(feedback::list).post(feedback::create),
        )
        .route("/feedback/{id}", delete(feedback::delete))
        // Wishlist
        .route("/wishlist", get(wishlist::list).post(wishlist::add))
        .route("/wishlist/{id}", delete(wishlist::remove))
        // Messages
        .route("/messages", get(messages::list).post(messages::create))
        .route("/messages/{id}", get(messages::show))
        // Notifications
        .route(
            "/notifications",
            get(notifications::list).post(notifications::create),
        )
        .route("/notifications/read_all", post(notifications::mark_all_read))
        .route("/notifications/{id}", delete(notifications::delete))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        // Search
        .route("/search", get(search::search))
        .route(
            "/search/history",
            get(search::history).delete(search::clear_history),
        )
        // Dashboards
        .route("/dashboard/admin", get(dashboard::admin))
        .route("/dashboard/retailer", get(dashboard::retailer))
        // Realtime
        .route("/ws", get(ws::upgrade))
}

/// All routes, without rate limiting.
pub fn routes() -> Router<AppState> {
    api_routes().merge(credential_routes())
}

async fn home() -> &'static str {
    "Welcome to BuyGenius"
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    //! Router tests. The pool points at a closed port, so anything that
    //! reaches the database fails fast. Role checks against real accounts
    //! live in the integration-tests crate.

    use std::time::Duration;

    use super::*;
    use axum::{
        Json,
        body::{Body, to_bytes},
        http::{Request, header},
        response::Response,
    };
    use serde_json::{Value, json};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session};

    use buygenius_core::UserId;

    use crate::config::tests::test_config;
    use crate::middleware::{session_layer, set_current_user};
    use crate::models::CurrentUser;

    async fn login_as(session: Session, Json(user): Json<CurrentUser>) -> StatusCode {
        set_current_user(&session, &user).await.unwrap();
        StatusCode::NO_CONTENT
    }

    fn app() -> Router {
        let config = test_config();
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("postgres://buygenius@127.0.0.1:1/buygenius_test")
            .unwrap();
        let layer = session_layer(MemoryStore::default(), &config);

        routes()
            .route("/test/login_as", post(login_as))
            .layer(layer)
            .with_state(AppState::new(config, pool))
    }

    fn user(id: i32, is_admin: bool, is_retailer: bool) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            username: format!("user{id}"),
            is_admin,
            is_retailer,
        }
    }

    /// Log in on `app` and return the session cookie.
    async fn session_cookie(app: &Router, user: &CurrentUser) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::post("/test/login_as")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(user).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_home_and_health() {
        let app = app();

        let response = send(&app, "GET", "/", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Welcome to BuyGenius");

        let response = send(&app, "GET", "/health", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_anonymous_is_unauthorized() {
        let app = app();
        for (method, uri) in [
            ("GET", "/users"),
            ("GET", "/wishlist"),
            ("GET", "/messages"),
            ("GET", "/notifications"),
            ("GET", "/search/history"),
            ("GET", "/dashboard/admin"),
            ("GET", "/dashboard/retailer"),
        ] {
            let response = send(&app, method, uri, None, None).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(json_body(response).await, json!({ "error": "Unauthorized" }));
        }
    }

    #[tokio::test]
    async fn test_session_role_is_not_trusted_without_the_account() {
        let app = app();
        let cookie = session_cookie(&app, &user(1, true, false)).await;

        // An admin flag cached in the session grants nothing when the
        // account cannot be re-read.
        for (method, uri) in [
            ("GET", "/users"),
            ("GET", "/dashboard/admin"),
            ("GET", "/wishlist"),
            ("GET", "/check_session"),
        ] {
            let response = send(&app, method, uri, Some(&cookie), None).await;
            assert_eq!(
                response.status(),
                StatusCode::INTERNAL_SERVER_ERROR,
                "{method} {uri}"
            );
            assert_eq!(
                json_body(response).await,
                json!({ "error": "Internal server error" })
            );
        }
    }

    #[tokio::test]
    async fn test_check_session_without_login_is_no_content() {
        let app = app();
        let response = send(&app, "GET", "/check_session", None, None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_logout_ends_login() {
        let app = app();
        let cookie = session_cookie(&app, &user(2, false, false)).await;

        let response = send(&app, "DELETE", "/logout", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, "GET", "/wishlist", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_clear_session_ends_login() {
        let app = app();
        let cookie = session_cookie(&app, &user(2, false, false)).await;

        let response = send(&app, "DELETE", "/clear_session", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, "GET", "/messages", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_json_400() {
        let app = app();
        let response = app
            .clone()
            .oneshot(
                Request::post("/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"username\": "))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_bad_path_id_is_a_json_400() {
        let app = app();
        let response = send(&app, "GET", "/categories/abc", None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_search_requires_term() {
        let app = app();
        for uri in ["/search", "/search?q=", "/search?q=%20%20"] {
            let response = send(&app, "GET", uri, None, None).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(
                json_body(response).await,
                json!({ "error": "Search term is required" })
            );
        }
    }

    #[tokio::test]
    async fn test_search_term_with_nul_is_a_json_400() {
        let app = app();
        let response = send(&app, "GET", "/search?q=phone%00", None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Search term must not contain NUL characters" })
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = app();
        let response = send(&app, "GET", "/nope", None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
