use std::env;
use std::path::PathBuf;

use chrono_tz::Tz;

use crate::date_utils::ReferenceTz;

pub const DEFAULT_SANDBOX_URL: &str = "http://api.nessieisreal.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base URL of the banking sandbox that serves deposits and withdrawals.
    pub sandbox_url: String,
    pub sandbox_api_key: String,
    pub labels_path: PathBuf,
    pub timezone: ReferenceTz,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let timezone = match env::var("HUSTLE_TIMEZONE") {
            Ok(name) if !name.trim().is_empty() => match name.parse::<ReferenceTz>() {
                Ok(tz) => tz,
                Err(_) => {
                    tracing::warn!(timezone = %name, "Unknown HUSTLE_TIMEZONE, using UTC");
                    ReferenceTz::utc()
                }
            },
            _ => ReferenceTz::utc(),
        };

        let sandbox_api_key = env::var("NESSIE_API_KEY").unwrap_or_default();
        if sandbox_api_key.is_empty() {
            tracing::warn!("NESSIE_API_KEY is not set; upstream requests will be rejected");
        }

        Self {
            host: env::var("HUSTLE_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("HUSTLE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(7070),
            sandbox_url: env::var("NESSIE_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_SANDBOX_URL.into()),
            sandbox_api_key,
            labels_path: env::var("HUSTLE_LABELS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/sidehustles.json")),
            timezone,
            request_timeout_secs: env::var("HUSTLE_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(30),
        }
    }

    /// Configuration for tests and embedding: no upstream key.
    pub fn for_tests(labels_path: PathBuf, timezone: Tz) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            sandbox_url: DEFAULT_SANDBOX_URL.into(),
            sandbox_api_key: String::new(),
            labels_path,
            timezone: ReferenceTz::new(timezone),
            request_timeout_secs: 5,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
