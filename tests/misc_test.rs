//! Miscellaneous integration tests (health check, unicode, error envelope).

mod common;

use axum::http::StatusCode;
use common::{record, today_at, TestClient};
use serde_json::json;

/// Test health endpoint.
#[tokio::test]
async fn test_health_endpoint() {
    let client = TestClient::new();
    let (status, body) = client.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

/// Unknown routes get the JSON error body, not an empty 404.
#[tokio::test]
async fn test_unknown_route() {
    let client = TestClient::new();
    let (status, body) = client.get_json("/api/nowhere").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
    assert_eq!(body["retryable"], false);
}

/// Test unicode in descriptions and labels.
#[tokio::test]
async fn test_unicode_descriptions() {
    let client = TestClient::builder()
        .labels(&["café"])
        .records(
            vec![record("d1", 18.0, "Café François ☕", &today_at(8, 0))],
            vec![record("w1", 4.0, "東京レストラン", &today_at(9, 0))],
        )
        .build();

    let (status, body) = client.get_json(&TestClient::url("/categories")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["income"]["café"], 18.0);
    assert_eq!(body["expenses"]["Other"], 4.0);

    let (status, body) = client
        .post_json(
            &TestClient::url("/deposits"),
            json!({"amount": 2, "description": "CAFÉ tips"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["record"]["description"], "CAFÉ tips");

    let (_, body) = client.get_json(&TestClient::url("/dashboard")).await;
    assert_eq!(body["total_income"], 20.0);
}

/// Records that cannot be read are counted, never fatal.
#[tokio::test]
async fn test_malformed_records_are_skipped() {
    let mut missing_amount = record("m1", 0.0, "Uber Income", &today_at(9, 0));
    missing_amount.amount = serde_json::Value::Null;
    let mut word_amount = record("w", 0.0, "Uber Income", &today_at(9, 30));
    word_amount.amount = json!("twelve");
    let client = TestClient::builder()
        .labels(&["Uber"])
        .records(
            vec![
                record("d1", 10.0, "Uber Income", &today_at(8, 0)),
                record("neg", -3.0, "Uber Income", &today_at(8, 30)),
                missing_amount,
                word_amount,
                record("bad", 5.0, "Uber Income", "15/05/2024"),
            ],
            vec![],
        )
        .build();

    let (status, body) = client.get_json(&TestClient::url("/summaries")).await;
    assert_eq!(status, StatusCode::OK);
    // Sign comes from the record kind, so -3 counts as a 3.00 deposit
    assert_eq!(body["running_totals"]["14"], 13.0);
    assert_eq!(body["metadata"]["skipped_records"], 3);
}
