//! Signup, login and session lifecycle against a running server.
//!
//! Run with: cargo test -p buygenius-integration-tests -- --ignored

use buygenius_integration_tests::{
    TEST_PASSWORD, TestUser, admin_client, client, expect_json, url,
};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_signup_starts_a_session() {
    let user = TestUser::signup(false).await;

    let resp = user
        .client
        .get(url("/check_session"))
        .send()
        .await
        .expect("check_session failed");
    let me = expect_json(resp, StatusCode::OK).await;
    assert_eq!(me["username"], user.username.as_str());
    assert_eq!(me["is_admin"], false);
    assert_eq!(me["is_retailer"], false);

    user.delete().await;
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_logout_then_login() {
    let user = TestUser::signup(false).await;

    let resp = user.client.delete(url("/logout")).send().await.expect("logout failed");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = user
        .client
        .get(url("/check_session"))
        .send()
        .await
        .expect("check_session failed");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = user
        .client
        .post(url("/login"))
        .json(&json!({ "email": user.email, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("login failed");
    let me = expect_json(resp, StatusCode::OK).await;
    assert_eq!(me["id"], user.id);

    user.delete().await;
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_wrong_password_is_unauthorized() {
    let user = TestUser::signup(false).await;

    let resp = client()
        .post(url("/login"))
        .json(&json!({ "email": user.email, "password": "not-the-password" }))
        .send()
        .await
        .expect("login failed");
    let body = expect_json(resp, StatusCode::UNAUTHORIZED).await;
    assert!(body["error"].is_string());

    user.delete().await;
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_signup_conflicts() {
    let user = TestUser::signup(false).await;

    let resp = client()
        .post(url("/signup"))
        .json(&json!({
            "username": format!("{}x", user.username),
            "email": user.email,
            "password": TEST_PASSWORD,
        }))
        .send()
        .await
        .expect("signup failed");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    user.delete().await;
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_signup_cannot_claim_admin() {
    let user = TestUser::signup(false).await;

    let resp = user
        .client
        .put(url(&format!("/users/{}", user.id)))
        .json(&json!({ "is_admin": true }))
        .send()
        .await
        .expect("update failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    user.delete().await;
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_customer_is_forbidden_from_admin_and_retailer_routes() {
    let user = TestUser::signup(false).await;
    let other = TestUser::signup(false).await;

    let resp = user.client.get(url("/users")).send().await.expect("list failed");
    let body = expect_json(resp, StatusCode::FORBIDDEN).await;
    assert_eq!(body["error"], "Admin access required");

    let resp = user
        .client
        .post(url("/categories"))
        .json(&json!({ "name": "Toys" }))
        .send()
        .await
        .expect("create failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = user
        .client
        .get(url("/dashboard/retailer"))
        .send()
        .await
        .expect("dashboard failed");
    let body = expect_json(resp, StatusCode::FORBIDDEN).await;
    assert_eq!(body["error"], "Retailer access required");

    let resp = user
        .client
        .get(url(&format!("/users/{}", other.id)))
        .send()
        .await
        .expect("show failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    other.delete().await;
    user.delete().await;
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_role_changes_apply_to_live_sessions() {
    let admin = admin_client().await;
    let user = TestUser::signup(false).await;
    let user_url = url(&format!("/users/{}", user.id));

    let resp = user.client.get(url("/users")).send().await.expect("list failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Promotion takes effect without logging in again.
    let resp = admin
        .put(&user_url)
        .json(&json!({ "is_admin": true }))
        .send()
        .await
        .expect("promote failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = user.client.get(url("/users")).send().await.expect("list failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // So does demotion.
    let resp = admin
        .put(&user_url)
        .json(&json!({ "is_admin": false }))
        .send()
        .await
        .expect("demote failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = user.client.get(url("/users")).send().await.expect("list failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // A deleted account's session is no longer a login.
    let resp = admin.delete(&user_url).send().await.expect("delete failed");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = user.client.get(url("/wishlist")).send().await.expect("wishlist failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = user
        .client
        .get(url("/check_session"))
        .send()
        .await
        .expect("check_session failed");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
