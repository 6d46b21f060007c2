//! Retailer onboarding, listings and the per-user records around them.
//!
//! Run with: cargo test -p buygenius-integration-tests -- --ignored

use buygenius_integration_tests::{TestUser, admin_client, expect_json, url};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_retailer_lifecycle() {
    let admin = admin_client().await;
    let seller = TestUser::signup(false).await;
    let buyer = TestUser::signup(false).await;

    // Category for the listing
    let category_name = format!("IT {}", Uuid::new_v4().simple());
    let resp = admin
        .post(url("/categories"))
        .json(&json!({ "name": category_name }))
        .send()
        .await
        .expect("create category failed");
    let category = expect_json(resp, StatusCode::CREATED).await;

    // Register as a retailer; starts unapproved
    let resp = seller
        .client
        .post(url("/retailers"))
        .json(&json!({ "name": format!("{} Traders", seller.username) }))
        .send()
        .await
        .expect("create retailer failed");
    let retailer = expect_json(resp, StatusCode::CREATED).await;
    assert_eq!(retailer["approved"], false);
    assert_eq!(retailer["user_id"], seller.id);

    let listing = json!({
        "name": "Integration Kettle",
        "price": 2500,
        "delivery_cost": 200,
        "category_id": category["id"],
        "estimated_value": 3000,
        "marginal_benefit": 0.1,
    });

    let resp = seller
        .client
        .post(url("/products"))
        .json(&listing)
        .send()
        .await
        .expect("create product failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Approval lets the seller list and notifies them
    let resp = admin
        .post(url(&format!("/retailers/{}/approve", retailer["id"])))
        .send()
        .await
        .expect("approve failed");
    let approved = expect_json(resp, StatusCode::OK).await;
    assert_eq!(approved["approved"], true);

    let resp = seller
        .client
        .get(url("/notifications?unread=true"))
        .send()
        .await
        .expect("notifications failed");
    let notifications = expect_json(resp, StatusCode::OK).await;
    assert!(!as_array(&notifications).is_empty());

    let resp = seller
        .client
        .post(url("/products"))
        .json(&listing)
        .send()
        .await
        .expect("create product failed");
    let product = expect_json(resp, StatusCode::CREATED).await;
    assert_eq!(product["retailer_id"], retailer["id"]);
    let product_id = product["id"].clone();

    // Buyer saves, reviews and asks about it
    let resp = buyer
        .client
        .post(url("/wishlist"))
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("wishlist add failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = buyer
        .client
        .post(url("/wishlist"))
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("wishlist add failed");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = buyer
        .client
        .post(url(&format!("/products/{product_id}/feedback")))
        .json(&json!({ "comment": "Boils fast", "rating": 5 }))
        .send()
        .await
        .expect("feedback failed");
    let feedback = expect_json(resp, StatusCode::CREATED).await;
    assert_eq!(feedback["rating"], 5);

    let resp = buyer
        .client
        .post(url("/messages"))
        .json(&json!({
            "receiver_id": seller.id,
            "content": "Do you deliver to Nakuru?",
            "product_id": product_id,
        }))
        .send()
        .await
        .expect("message failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Detail carries the feedback; the seller dashboard sees everything
    let resp = buyer
        .client
        .get(url(&format!("/products/{product_id}")))
        .send()
        .await
        .expect("product detail failed");
    let detail = expect_json(resp, StatusCode::OK).await;
    assert_eq!(as_array(&detail["feedback"]).len(), 1);

    let resp = seller
        .client
        .get(url("/dashboard/retailer"))
        .send()
        .await
        .expect("retailer dashboard failed");
    let dashboard = expect_json(resp, StatusCode::OK).await;
    assert_eq!(dashboard["products"], 1);
    assert_eq!(dashboard["feedback"], 1);

    // Someone else's product is off limits
    let resp = buyer
        .client
        .delete(url(&format!("/products/{product_id}")))
        .send()
        .await
        .expect("delete product failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    buyer.delete().await;
    seller.delete().await;
    let _ = admin
        .delete(url(&format!("/categories/{}", category["id"])))
        .send()
        .await;
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_admin_dashboard_counts() {
    let admin = admin_client().await;

    let resp = admin
        .get(url("/dashboard/admin"))
        .send()
        .await
        .expect("admin dashboard failed");
    let dashboard = expect_json(resp, StatusCode::OK).await;
    assert!(dashboard["users"].as_i64().unwrap_or_default() >= 1);
    assert!(dashboard["categories"].as_i64().unwrap_or_default() >= 3);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_notifications_mark_read() {
    let admin = admin_client().await;
    let user = TestUser::signup(false).await;

    let resp = admin
        .post(url("/notifications"))
        .json(&json!({ "user_id": user.id, "message": "Welcome aboard" }))
        .send()
        .await
        .expect("create notification failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = user
        .client
        .post(url("/notifications/read_all"))
        .send()
        .await
        .expect("mark all read failed");
    let marked = expect_json(resp, StatusCode::OK).await;
    assert_eq!(marked["updated"], 1);

    let resp = user
        .client
        .get(url("/notifications?unread=true"))
        .send()
        .await
        .expect("notifications failed");
    let unread = expect_json(resp, StatusCode::OK).await;
    assert!(as_array(&unread).is_empty());

    user.delete().await;
}

fn as_array(value: &Value) -> &Vec<Value> {
    value.as_array().expect("expected a JSON array")
}
