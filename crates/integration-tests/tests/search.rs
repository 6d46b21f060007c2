//! Ranked search over the seeded catalog.
//!
//! Run with: cargo test -p buygenius-integration-tests -- --ignored

use buygenius_integration_tests::{TestUser, client, expect_json, url};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_search_ranks_best_value_first() {
    let resp = client()
        .get(url("/search?q=samsung"))
        .send()
        .await
        .expect("search failed");
    let results = expect_json(resp, StatusCode::OK).await;
    let results = results.as_array().expect("expected a JSON array");

    assert_eq!(results.len(), 4);
    let totals: Vec<f64> = results
        .iter()
        .map(|r| r["score"]["total"].as_f64().expect("total"))
        .collect();
    assert!(totals.windows(2).all(|w| w[0] >= w[1]), "{totals:?}");

    let ranks: Vec<u64> = results
        .iter()
        .map(|r| r["rank"].as_u64().expect("rank"))
        .collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_search_without_match_is_empty() {
    let resp = client()
        .get(url("/search?q=definitely-not-a-product"))
        .send()
        .await
        .expect("search failed");
    let results = expect_json(resp, StatusCode::OK).await;
    assert_eq!(results.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_search_history_is_recorded_and_cleared() {
    let user = TestUser::signup(false).await;

    let resp = user
        .client
        .get(url("/search?q=EliteBook"))
        .send()
        .await
        .expect("search failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = user
        .client
        .get(url("/search/history"))
        .send()
        .await
        .expect("history failed");
    let history = expect_json(resp, StatusCode::OK).await;
    assert_eq!(history[0]["search_term"], "EliteBook");

    let resp = user
        .client
        .delete(url("/search/history"))
        .send()
        .await
        .expect("clear history failed");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    user.delete().await;
}
