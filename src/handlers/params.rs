use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::date_utils::{parse_date, DateRange, RangePreset, ReferenceTz};
use crate::error::{AppError, AppResult};
use crate::models::{Granularity, LabelFilter, SeriesView};
use crate::services::normalizer::parse_timestamp;
use crate::services::report::{DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT};
use crate::state::AppState;

/// Query-string parameters shared by the reporting endpoints.
///
/// Everything is taken as a string so that a bad value becomes an
/// `InvalidQuery` JSON error rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub granularity: Option<String>,
    pub range: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub view: Option<String>,
    pub scope: Option<String>,
    pub label: Option<String>,
    pub tz: Option<String>,
    pub as_of: Option<String>,
    pub limit: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ReportParams {
    pub fn timezone(&self, state: &AppState) -> AppResult<ReferenceTz> {
        match present(&self.tz) {
            Some(name) => name.parse(),
            None => Ok(state.config.timezone),
        }
    }

    /// The instant treated as "now": `as_of` when given, else the clock.
    pub fn now(&self, state: &AppState) -> AppResult<DateTime<Utc>> {
        match present(&self.as_of) {
            Some(value) => parse_timestamp(value).ok_or_else(|| {
                AppError::InvalidQuery(format!(
                    "Invalid as_of '{}' (expected RFC 3339 or YYYY-MM-DD)",
                    value
                ))
            }),
            None => Ok(state.now()),
        }
    }

    pub fn granularity(&self, default: Granularity) -> AppResult<Granularity> {
        present(&self.granularity).map_or(Ok(default), |v| v.parse())
    }

    pub fn view(&self, default: SeriesView) -> AppResult<SeriesView> {
        present(&self.view).map_or(Ok(default), |v| v.parse())
    }

    /// `label=<name>` selects one side hustle, `scope=side-hustles` all of
    /// them. The two cannot be combined.
    pub fn label_filter(&self) -> AppResult<LabelFilter> {
        let scoped = match present(&self.scope) {
            None => false,
            Some(scope) => match scope.to_ascii_lowercase().replace('_', "-").as_str() {
                "all" => false,
                "side-hustles" | "sidehustles" | "labelled" | "labeled" => true,
                _ => {
                    return Err(AppError::InvalidQuery(format!(
                        "Unknown scope '{}'. Use: all, side-hustles",
                        scope
                    )))
                }
            },
        };

        match (&self.label, scoped) {
            (Some(_), true) => Err(AppError::InvalidQuery(
                "Use either label or scope=side-hustles, not both".into(),
            )),
            (Some(label), false) => LabelFilter::exact(label),
            (None, true) => Ok(LabelFilter::AnyKnownLabel),
            (None, false) => Ok(LabelFilter::Unfiltered),
        }
    }

    /// Range from `from`/`to` when given, otherwise from `range` (or
    /// `default`). `range=all` is only accepted when `allow_all` is set.
    pub fn date_range(
        &self,
        default: RangePreset,
        now: DateTime<Utc>,
        tz: ReferenceTz,
        allow_all: bool,
    ) -> AppResult<DateRange> {
        let from = present(&self.from);
        let to = present(&self.to);

        if from.is_some() || to.is_some() {
            if present(&self.range).is_some() {
                return Err(AppError::InvalidQuery(
                    "Use either range or from/to, not both".into(),
                ));
            }
            let from = from
                .ok_or_else(|| AppError::InvalidQuery("A custom range needs 'from'".into()))?;
            let from = parse_date("from", from)?;
            let to = match to {
                Some(to) => parse_date("to", to)?,
                None => tz.date_of(now),
            };
            return DateRange::from_dates(from, to, now, tz);
        }

        let preset = match present(&self.range) {
            Some(value) => value.parse::<RangePreset>()?,
            None => default,
        };
        if preset == RangePreset::All && !allow_all {
            return Err(AppError::InvalidQuery(
                "range=all is not supported for running totals".into(),
            ));
        }
        Ok(DateRange::from_preset(preset, now, tz))
    }

    pub fn limit(&self) -> AppResult<usize> {
        match present(&self.limit) {
            None => Ok(DEFAULT_RECENT_LIMIT),
            Some(value) => match value.parse::<usize>() {
                Ok(0) | Err(_) => Err(AppError::InvalidQuery(format!(
                    "Invalid limit '{}' (expected a positive integer)",
                    value
                ))),
                Ok(n) => Ok(n.min(MAX_RECENT_LIMIT)),
            },
        }
    }
}
