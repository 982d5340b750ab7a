//! Shared test utilities for integration tests.
//!
//! This module provides a `TestClient` that drives the router directly against
//! in-memory collaborators and a fixed clock. Methods are intentionally broad
//! to support various test scenarios across different test files.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use hustle_ledger::config::Config;
use hustle_ledger::models::RawRecord;
use hustle_ledger::server::build_router;
use hustle_ledger::sources::{LabelStore, MemoryLabelStore, MemorySource, TransactionSource};
use hustle_ledger::state::{AppState, Clock};
use tower::ServiceExt;

pub const ACCOUNT: &str = "acc-1";

/// Wednesday 2024-05-15 14:30 UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap()
}

/// `2024-05-15T<hh>:<mm>:00Z`
pub fn today_at(hour: u32, minute: u32) -> String {
    format!("2024-05-15T{:02}:{:02}:00Z", hour, minute)
}

/// A sandbox record as the upstream would return it.
pub fn record(id: &str, amount: f64, description: &str, date: &str) -> RawRecord {
    RawRecord::new(amount, description, date).with_id(id)
}

/// A small account: two side hustles, some unlabeled noise, one malformed
/// deposit. "Today" is Wednesday 2024-05-15.
pub fn seeded() -> TestClientBuilder {
    TestClient::builder().labels(&["Uber", "Etsy"]).records(
        vec![
            record("d1", 45.0, "Uber Income", &today_at(9, 15)),
            record("d2", 20.0, "Etsy sale", &today_at(11, 0)),
            record("d3", 100.0, "Payroll", &today_at(12, 0)),
            record("d4", 30.0, "Uber Income", "2024-05-13T10:00:00Z"),
            record("d5", 7.0, "Uber tips", "2024-04-05T10:00:00Z"),
            record("bad", 10.0, "Uber Income", "not a date"),
        ],
        vec![
            record("w1", 15.0, "Uber - Gas", &today_at(10, 0)),
            record("w2", 8.0, "Groceries", &today_at(13, 0)),
            record("w3", 5.0, "Etsy fees", "2024-05-02T09:00:00Z"),
        ],
    )
}

/// Builder for a [`TestClient`].
pub struct TestClientBuilder {
    source: MemorySource,
    labels: MemoryLabelStore,
    source_offline: bool,
    labels_offline: bool,
    timezone: chrono_tz::Tz,
}

impl TestClientBuilder {
    pub fn records(mut self, deposits: Vec<RawRecord>, withdrawals: Vec<RawRecord>) -> Self {
        self.source = self.source.with_records(ACCOUNT, deposits, withdrawals);
        self
    }

    pub fn labels(mut self, labels: &[&str]) -> Self {
        self.labels = self.labels.with_labels(ACCOUNT, labels.iter().copied());
        self
    }

    pub fn source_offline(mut self) -> Self {
        self.source_offline = true;
        self
    }

    pub fn labels_offline(mut self) -> Self {
        self.labels_offline = true;
        self
    }

    pub fn timezone(mut self, tz: chrono_tz::Tz) -> Self {
        self.timezone = tz;
        self
    }

    pub fn build(self) -> TestClient {
        let source: Arc<dyn TransactionSource> = if self.source_offline {
            Arc::new(MemorySource::offline())
        } else {
            Arc::new(self.source)
        };
        let labels: Arc<dyn LabelStore> = if self.labels_offline {
            Arc::new(MemoryLabelStore::offline())
        } else {
            Arc::new(self.labels)
        };

        let config = Config::for_tests(PathBuf::from("unused.json"), self.timezone);
        let state = AppState::new(config, source, labels).with_clock(Clock::Fixed(now()));
        TestClient { state }
    }
}

/// A test client allowing sequential requests against the application.
pub struct TestClient {
    state: AppState,
}

impl TestClient {
    /// Client with no records, no labels and a fixed clock.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TestClientBuilder {
        TestClientBuilder {
            source: MemorySource::new(),
            labels: MemoryLabelStore::new(),
            source_offline: false,
            labels_offline: false,
            timezone: chrono_tz::UTC,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn url(path: &str) -> String {
        format!("/api/accounts/{}{}", ACCOUNT, path)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).to_string())
    }

    /// Make a GET request and return status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// GET and parse the body as JSON.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.get(uri).await;
        let parsed = serde_json::from_str(&body)
            .unwrap_or_else(|e| panic!("GET {} returned non-JSON body {:?}: {}", uri, body, e));
        (status, parsed)
    }

    /// POST a JSON body and parse the JSON response.
    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let (status, body) = self
            .send(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await;
        (status, serde_json::from_str(&body).unwrap_or(serde_json::Value::Null))
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self
            .send(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        (status, serde_json::from_str(&body).unwrap_or(serde_json::Value::Null))
    }
}
