use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::AppResult;
use crate::services::snapshot::Ledger;
use crate::sources::{LabelStore, TransactionSource};

/// Source of "now". Handlers never call `Utc::now()` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(ts) => *ts,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub source: Arc<dyn TransactionSource>,
    pub labels: Arc<dyn LabelStore>,
    pub clock: Clock,
}

impl AppState {
    pub fn new(
        config: Config,
        source: Arc<dyn TransactionSource>,
        labels: Arc<dyn LabelStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            source,
            labels,
            clock: Clock::System,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Fresh snapshot of an account's transactions and labels.
    pub async fn load_ledger(&self, account_id: &str) -> AppResult<Ledger> {
        Ledger::load(self.source.as_ref(), self.labels.as_ref(), account_id).await
    }
}
