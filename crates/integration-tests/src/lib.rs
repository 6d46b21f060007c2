//! Live HTTP tests for the BuyGenius API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p buygenius-cli -- migrate
//! cargo run -p buygenius-cli -- seed --reset
//! BUYGENIUS_TRUSTED_PROXIES=127.0.0.1,::1 cargo run -p buygenius-server &
//! cargo test -p buygenius-integration-tests -- --ignored
//! ```
//!
//! Each client reports its own `X-Forwarded-For` address, so trusting the
//! loopback peer gives every client a separate signup/login rate bucket.
//!
//! The tests talk to `BUYGENIUS_BASE_URL` (default
//! `http://localhost:5000`) and log in as the seeded admin unless
//! `BUYGENIUS_TEST_ADMIN_EMAIL` / `BUYGENIUS_TEST_ADMIN_PASSWORD` say
//! otherwise. Every account they create gets a random name, so runs do not
//! collide.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Password used for accounts created by the tests.
pub const TEST_PASSWORD: &str = "integration-pass";

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("BUYGENIUS_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Build a full URL for `path`.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url().trim_end_matches('/'))
}

/// A client that keeps the session cookie between requests.
#[must_use]
pub fn client() -> Client {
    let bytes = Uuid::new_v4().into_bytes();
    let forwarded = format!("198.18.{}.{}", bytes[0], bytes[1]);
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_str(&forwarded).expect("valid header value"),
    );

    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// A freshly signed-up account and the client holding its session.
pub struct TestUser {
    pub client: Client,
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl TestUser {
    /// Sign up a new account with a random name.
    pub async fn signup(is_retailer: bool) -> Self {
        let client = client();
        let tag = Uuid::new_v4().simple().to_string();
        let username = format!("it_{}", tag.chars().take(12).collect::<String>());
        let email = format!("{username}@example.com");

        let resp = client
            .post(url("/signup"))
            .json(&json!({
                "username": username,
                "email": email,
                "password": TEST_PASSWORD,
                "is_retailer": is_retailer,
            }))
            .send()
            .await
            .expect("Failed to sign up");
        let user = expect_json(resp, StatusCode::CREATED).await;

        Self {
            client,
            id: user["id"].as_i64().expect("user id"),
            username,
            email,
        }
    }

    /// Delete the account; everything it owns cascades.
    pub async fn delete(self) {
        let _ = self
            .client
            .delete(url(&format!("/users/{}", self.id)))
            .send()
            .await;
    }
}

/// Log in as the seeded (or configured) admin.
pub async fn admin_client() -> Client {
    let email = std::env::var("BUYGENIUS_TEST_ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@buygenius.com".to_string());
    let password = std::env::var("BUYGENIUS_TEST_ADMIN_PASSWORD")
        .unwrap_or_else(|_| "admin123".to_string());

    let client = client();
    let resp = client
        .post(url("/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to log in as admin");
    let user = expect_json(resp, StatusCode::OK).await;
    assert_eq!(user["is_admin"], true, "configured admin account lacks admin rights");

    client
}

/// Assert the status and decode the JSON body.
pub async fn expect_json(resp: Response, status: StatusCode) -> Value {
    let actual = resp.status();
    let body = resp.text().await.expect("Failed to read response");
    assert_eq!(actual, status, "unexpected status, body: {body}");
    serde_json::from_str(&body).expect("response is not JSON")
}
