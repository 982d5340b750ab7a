use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::transaction::TransactionKind;

/// A deposit or withdrawal exactly as the banking sandbox returns it.
///
/// Every field is optional and accepts any JSON type on the wire so that one
/// bad record cannot fail the whole listing; validation happens during
/// normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub amount: Value,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub transaction_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub medium: Option<String>,
}

/// Strings pass through, numbers keep their JSON spelling, anything else is
/// treated as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

impl RawRecord {
    pub fn new(amount: f64, description: &str, transaction_date: &str) -> Self {
        Self {
            id: None,
            amount: Value::from(amount),
            description: Some(description.to_string()),
            transaction_date: Some(transaction_date.to_string()),
            status: None,
            medium: None,
        }
    }

    /// Converts a listing element by element. An element that is not a JSON
    /// object becomes an empty record, which normalization then skips.
    pub fn from_values(values: Vec<Value>) -> Vec<Self> {
        values
            .into_iter()
            .map(|value| serde_json::from_value(value).unwrap_or_default())
            .collect()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The record as it will look upstream once stored, minus its id.
    pub fn from_new(record: &NewRecord) -> Self {
        Self {
            id: None,
            amount: Value::from(record.amount),
            description: Some(record.description.clone()),
            transaction_date: Some(record.transaction_date.clone()),
            status: Some(record.status.clone()),
            medium: Some(record.medium.clone()),
        }
    }
}

/// Payload accepted when recording a new deposit or withdrawal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTransactionForm {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub transaction_date: Option<String>,
}

/// Validated record ready to be posted upstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecord {
    pub medium: String,
    pub transaction_date: String,
    pub status: String,
    pub amount: f64,
    pub description: String,
}

impl NewRecord {
    pub fn from_form(
        form: NewTransactionForm,
        kind: TransactionKind,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let amount = match form.amount {
            Some(a) if a.is_finite() && a > 0.0 => a,
            _ => {
                return Err(AppError::Validation(format!(
                    "Invalid {} amount: must be a positive number",
                    kind.source_name()
                )))
            }
        };

        let timestamp = match form.transaction_date.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => crate::services::normalizer::parse_timestamp(s)
                .ok_or_else(|| {
                    AppError::Validation(format!("Invalid transaction date format: {}", s))
                })?,
            _ => now,
        };

        let description = form
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| kind.default_description().to_string());

        Ok(Self {
            medium: "balance".into(),
            transaction_date: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            status: "completed".into(),
            amount,
            description,
        })
    }
}
