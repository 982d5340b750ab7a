use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, Collaborator};
use crate::models::{NewRecord, RawRecord, TransactionKind};
use crate::sources::TransactionSource;

/// Client for the Nessie banking sandbox.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Body returned by the sandbox after a POST.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedResponse {
    #[serde(default)]
    object_created: Option<RawRecord>,
}

fn collection(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "deposits",
        TransactionKind::Expense => "withdrawals",
    }
}

impl SandboxClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            &config.sandbox_url,
            &config.sandbox_api_key,
            config.request_timeout_secs,
        )
    }

    fn url(&self, account_id: &str, kind: TransactionKind) -> String {
        format!(
            "{}/accounts/{}/{}?key={}",
            self.base_url,
            urlencoding::encode(account_id),
            collection(kind),
            urlencoding::encode(&self.api_key)
        )
    }

    fn unavailable(account_id: &str, reason: impl Into<String>) -> AppError {
        AppError::source_unavailable(Collaborator::TransactionSource, account_id, reason)
    }
}

#[async_trait]
impl TransactionSource for SandboxClient {
    async fn list(&self, account_id: &str, kind: TransactionKind) -> AppResult<Vec<RawRecord>> {
        debug!(account_id, kind = collection(kind), "Fetching records from sandbox");

        let response = self
            .client
            .get(self.url(account_id, kind))
            .send()
            .await
            .map_err(|e| Self::unavailable(account_id, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(account_id, %status, body = %body, "Sandbox returned an error");
            return Err(Self::unavailable(
                account_id,
                format!("Sandbox returned {} for {}", status, collection(kind)),
            ));
        }

        let values = response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| Self::unavailable(account_id, format!("Unreadable response: {}", e)))?;
        Ok(RawRecord::from_values(values))
    }

    async fn create(
        &self,
        account_id: &str,
        kind: TransactionKind,
        record: &NewRecord,
    ) -> AppResult<RawRecord> {
        debug!(account_id, kind = collection(kind), "Creating record in sandbox");

        let response = self
            .client
            .post(self.url(account_id, kind))
            .json(record)
            .send()
            .await
            .map_err(|e| Self::unavailable(account_id, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(account_id, %status, body = %body, "Sandbox rejected new record");
            return Err(Self::unavailable(
                account_id,
                format!("Sandbox returned {} creating a {}", status, kind.source_name()),
            ));
        }

        let created: CreatedResponse = response
            .json()
            .await
            .map_err(|e| Self::unavailable(account_id, format!("Unreadable response: {}", e)))?;

        // Older sandbox builds answer with a bare acknowledgement.
        Ok(created
            .object_created
            .unwrap_or_else(|| RawRecord::from_new(record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_account_and_key() {
        let client = SandboxClient::new("http://sandbox.local/", "k&y", 5).unwrap();
        assert_eq!(
            client.url("acc 1", TransactionKind::Income),
            "http://sandbox.local/accounts/acc%201/deposits?key=k%26y"
        );
        assert_eq!(
            client.url("acc", TransactionKind::Expense),
            "http://sandbox.local/accounts/acc/withdrawals?key=k%26y"
        );
    }

    #[test]
    fn test_created_response_parsing() {
        let body = r#"{"code":201,"message":"Created deposit","objectCreated":{"_id":"abc","amount":12.5,"description":"Uber","transaction_date":"2024-05-01"}}"#;
        let parsed: CreatedResponse = serde_json::from_str(body).unwrap();
        let record = parsed.object_created.unwrap();
        assert_eq!(record.id.as_deref(), Some("abc"));

        let parsed: CreatedResponse = serde_json::from_str(r#"{"code":201}"#).unwrap();
        assert!(parsed.object_created.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_sandbox_is_source_unavailable() {
        // Port 9 (discard) on localhost is closed in test environments
        let client = SandboxClient::new("http://127.0.0.1:9", "key", 2).unwrap();
        let err = client.list_deposits("acc").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(
            err,
            AppError::SourceUnavailable {
                collaborator: Collaborator::TransactionSource,
                ..
            }
        ));
    }
}
