//! Integration tests for record listings, creation and the recent feed.

mod common;

use axum::http::StatusCode;
use common::{seeded, TestClient};
use serde_json::{json, Value};

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_list_deposits_in_source_order() {
    let client = seeded().build();
    let (status, body) = client.get_json(&TestClient::url("/deposits")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "income");
    assert_eq!(body["count"], 5);
    assert_eq!(body["total_amount"], 202.0);
    assert_eq!(ids(&body["records"]), vec!["d1", "d2", "d3", "d4", "d5"]);
    assert_eq!(body["records"][0]["label"], "Uber");
    assert!(body["records"][2]["label"].is_null());
    assert_eq!(body["metadata"]["skipped_records"], 1);
    assert_eq!(body["metadata"]["original_count"], 5);
}

#[tokio::test]
async fn test_list_filtered_by_label() {
    let client = seeded().build();

    let (_, body) = client
        .get_json(&TestClient::url("/deposits?label=uber"))
        .await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["total_amount"], 82.0);
    assert_eq!(ids(&body["records"]), vec!["d1", "d4", "d5"]);
    assert_eq!(body["metadata"]["label"], "uber");
    assert_eq!(body["metadata"]["filtered_count"], 3);

    let (_, body) = client
        .get_json(&TestClient::url("/withdrawals?label=Etsy"))
        .await;
    assert_eq!(body["kind"], "expense");
    assert_eq!(body["count"], 1);
    assert_eq!(body["total_amount"], 5.0);
    assert_eq!(body["metadata"]["skipped_records"], 0);
}

#[tokio::test]
async fn test_create_deposit_then_list() {
    let client = seeded().build();
    let (status, body) = client
        .post_json(
            &TestClient::url("/deposits"),
            json!({"amount": 12.5, "description": "Etsy sale"}),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Deposit created successfully");
    assert_eq!(body["kind"], "income");
    assert_eq!(body["record"]["amount"], 12.5);
    assert_eq!(body["record"]["transaction_date"], "2024-05-15T14:30:00.000Z");
    assert_eq!(body["record"]["status"], "completed");
    assert!(body["record"]["_id"].is_string());

    let (_, listing) = client
        .get_json(&TestClient::url("/deposits?label=Etsy"))
        .await;
    assert_eq!(listing["count"], 2);
    assert_eq!(listing["total_amount"], 32.5);
}

#[tokio::test]
async fn test_create_withdrawal_defaults_description() {
    let client = TestClient::new();
    let (status, body) = client
        .post_json(
            &TestClient::url("/withdrawals"),
            json!({"amount": 3, "transaction_date": "2024-05-14"}),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Withdrawal created successfully");
    assert_eq!(body["record"]["description"], "Withdrawal");
    assert_eq!(body["record"]["transaction_date"], "2024-05-14T00:00:00.000Z");
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let client = TestClient::new();
    for payload in [
        json!({"amount": -5}),
        json!({"amount": 0}),
        json!({"description": "no amount"}),
        json!({"amount": 5, "transaction_date": "someday"}),
    ] {
        let (status, body) = client
            .post_json(&TestClient::url("/deposits"), payload.clone())
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", payload);
        assert_eq!(body["kind"], "validation");
    }

    let (_, listing) = client.get_json(&TestClient::url("/deposits")).await;
    assert_eq!(listing["count"], 0);
}

#[tokio::test]
async fn test_create_against_offline_source() {
    let client = TestClient::builder().source_offline().build();
    let (status, body) = client
        .post_json(&TestClient::url("/deposits"), json!({"amount": 5}))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn test_recent_transactions() {
    let client = seeded().build();

    let (status, body) = client
        .get_json(&TestClient::url("/transactions?limit=3"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["transactions"]), vec!["w2", "d3", "d2"]);
    assert_eq!(body["count"], 3);
    assert_eq!(body["account_id"], common::ACCOUNT);

    let (_, body) = client
        .get_json(&TestClient::url("/transactions?label=Etsy"))
        .await;
    assert_eq!(ids(&body["transactions"]), vec!["d2", "w3"]);
    assert_eq!(body["label"], "Etsy");

    let (_, body) = client.get_json(&TestClient::url("/transactions")).await;
    assert_eq!(body["count"], 5);
}

#[tokio::test]
async fn test_recent_rejects_bad_limit() {
    let client = seeded().build();
    for query in ["/transactions?limit=0", "/transactions?limit=ten"] {
        let (status, _) = client.get_json(&TestClient::url(query)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", query);
    }
}
