use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;

use crate::date_utils::{months_between, week_start, DateRange, RangePreset, ReferenceTz};
use crate::error::{AppError, AppResult};
use crate::models::transaction::cents_to_amount;
use crate::models::{Granularity, OrderedMap, SeriesView, Transaction};

pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MAX_DAY_BUCKETS: i64 = 366;
const MAX_MONTH_BUCKETS: i64 = 120;

/// How a range is cut into buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketLayout {
    /// `00`..`23` within a single civil day.
    HourOfDay,
    /// `Sunday`..`Saturday` within a single week.
    Weekday,
    /// `Week 1`..`Week 5` within a single month, days 1-7 being week 1.
    WeekOfMonth,
    /// One bucket per civil day, labelled `YYYY-MM-DD`.
    DayOfRange,
    /// One bucket per calendar month, labelled `YYYY-MM`.
    MonthOfRange,
}

/// A bucket layout applied to a concrete range in a reference timezone.
///
/// The range end is "now" (or earlier), so only buckets up to and including
/// the one containing the range end are active; future buckets never exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBucketSpec {
    layout: BucketLayout,
    range: DateRange,
    tz: ReferenceTz,
}

impl TimeBucketSpec {
    pub fn new(layout: BucketLayout, range: DateRange, tz: ReferenceTz) -> AppResult<Self> {
        let spec = Self { layout, range, tz };
        let first = range.first_day(tz);
        let last = range.last_day(tz);
        match layout {
            BucketLayout::HourOfDay if first != last => Err(AppError::InvalidQuery(
                "Hourly buckets need a range within a single day".into(),
            )),
            BucketLayout::Weekday if week_start(first) != week_start(last) => Err(
                AppError::InvalidQuery("Weekday buckets need a range within a single week".into()),
            ),
            BucketLayout::WeekOfMonth
                if (first.year(), first.month()) != (last.year(), last.month()) =>
            {
                Err(AppError::InvalidQuery(
                    "Week-of-month buckets need a range within a single month".into(),
                ))
            }
            BucketLayout::DayOfRange if (last - first).num_days() >= MAX_DAY_BUCKETS => {
                Err(AppError::InvalidQuery(format!(
                    "Daily buckets cover at most {} days",
                    MAX_DAY_BUCKETS
                )))
            }
            BucketLayout::MonthOfRange if months_between(first, last) >= MAX_MONTH_BUCKETS => {
                Err(AppError::InvalidQuery(format!(
                    "Monthly buckets cover at most {} months",
                    MAX_MONTH_BUCKETS
                )))
            }
            _ => Ok(spec),
        }
    }

    /// Picks the layout for a granularity/range pair.
    pub fn resolve(granularity: Granularity, range: DateRange, tz: ReferenceTz) -> AppResult<Self> {
        let layout = match (granularity, range.preset) {
            (_, Some(RangePreset::All)) => None,
            (Granularity::Hour, Some(RangePreset::Today)) => Some(BucketLayout::HourOfDay),
            (Granularity::Hour, None) if range.first_day(tz) == range.last_day(tz) => {
                Some(BucketLayout::HourOfDay)
            }
            (Granularity::Day, Some(RangePreset::ThisWeek)) => Some(BucketLayout::Weekday),
            (Granularity::Day, _) => Some(BucketLayout::DayOfRange),
            (Granularity::Week, Some(RangePreset::ThisMonth)) => Some(BucketLayout::WeekOfMonth),
            (Granularity::Month, Some(RangePreset::ThisMonth))
            | (Granularity::Month, Some(RangePreset::Trailing30Days))
            | (Granularity::Month, None) => Some(BucketLayout::MonthOfRange),
            _ => None,
        };

        match layout {
            Some(layout) => Self::new(layout, range, tz),
            None => Err(AppError::InvalidQuery(format!(
                "Granularity '{}' is not supported for range '{}'",
                granularity.as_str(),
                range.preset.map(|p| p.as_str()).unwrap_or("custom")
            ))),
        }
    }

    pub fn layout(&self) -> BucketLayout {
        self.layout
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn tz(&self) -> ReferenceTz {
        self.tz
    }

    /// Index of the bucket holding the range end.
    fn last_index(&self) -> usize {
        let first = self.range.first_day(self.tz);
        let end = self.tz.local(self.range.end);
        let last = end.date_naive();
        match self.layout {
            BucketLayout::HourOfDay => end.hour() as usize,
            BucketLayout::Weekday => (last - week_start(first)).num_days() as usize,
            BucketLayout::WeekOfMonth => (last.day0() / 7) as usize,
            BucketLayout::DayOfRange => (last - first).num_days() as usize,
            BucketLayout::MonthOfRange => months_between(first, last) as usize,
        }
    }

    pub fn active_buckets(&self) -> usize {
        self.last_index() + 1
    }

    /// Labels of the active buckets, in order.
    pub fn bucket_labels(&self) -> Vec<String> {
        let first = self.range.first_day(self.tz);
        (0..self.active_buckets())
            .map(|i| match self.layout {
                BucketLayout::HourOfDay => format!("{:02}", i),
                BucketLayout::Weekday => {
                    let offset = week_start(first).weekday().num_days_from_sunday() as usize;
                    WEEKDAYS[(offset + i) % 7].to_string()
                }
                BucketLayout::WeekOfMonth => format!("Week {}", i + 1),
                BucketLayout::DayOfRange => (first + chrono::Duration::days(i as i64))
                    .format("%Y-%m-%d")
                    .to_string(),
                BucketLayout::MonthOfRange => {
                    let months = first.year() as i64 * 12 + first.month0() as i64 + i as i64;
                    format!("{:04}-{:02}", months.div_euclid(12), months.rem_euclid(12) + 1)
                }
            })
            .collect()
    }

    /// Bucket an instant falls into, `None` outside the active buckets.
    pub fn bucket_index(&self, ts: DateTime<Utc>) -> Option<usize> {
        if !self.range.contains(ts) {
            return None;
        }
        let first = self.range.first_day(self.tz);
        let local = self.tz.local(ts);
        let date = local.date_naive();
        let index = match self.layout {
            BucketLayout::HourOfDay => {
                if date != first {
                    return None;
                }
                local.hour() as i64
            }
            BucketLayout::Weekday => (date - week_start(first)).num_days(),
            BucketLayout::WeekOfMonth => {
                if (date.year(), date.month()) != (first.year(), first.month()) {
                    return None;
                }
                (date.day0() / 7) as i64
            }
            BucketLayout::DayOfRange => (date - first).num_days(),
            BucketLayout::MonthOfRange => months_between(first, date),
        };
        if index < 0 || index as usize > self.last_index() {
            return None;
        }
        Some(index as usize)
    }
}

/// Running totals for every active bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub labels: Vec<String>,
    pub totals_cents: Vec<i64>,
    /// Transactions that contributed to some bucket.
    pub counted: usize,
}

impl TimeSeries {
    pub fn running_totals(&self) -> OrderedMap<f64> {
        self.labels
            .iter()
            .cloned()
            .zip(self.totals_cents.iter().map(|c| cents_to_amount(*c)))
            .collect()
    }

    pub fn current_bucket(&self) -> Option<&str> {
        self.labels.last().map(String::as_str)
    }
}

/// Buckets transactions and keeps a running total.
///
/// Transactions are walked in timestamp order (stable, so ties keep their
/// input order). Each one moves the accumulator and the bucket it falls into
/// takes the accumulator's current value; later transactions in the same
/// bucket overwrite it. Buckets nobody touched carry the preceding bucket's
/// value forward, and leading empty buckets stay at 0.
pub fn aggregate(
    transactions: &[&Transaction],
    spec: &TimeBucketSpec,
    view: SeriesView,
) -> TimeSeries {
    let labels = spec.bucket_labels();
    let mut slots: Vec<Option<i64>> = vec![None; labels.len()];

    let mut ordered: Vec<&Transaction> = transactions.to_vec();
    ordered.sort_by_key(|t| t.timestamp());

    let mut running = 0i64;
    let mut counted = 0usize;
    for txn in ordered {
        let Some(index) = spec.bucket_index(txn.timestamp()) else {
            continue;
        };
        let Some(delta) = view.contribution(txn.kind(), txn.amount_cents()) else {
            continue;
        };
        if let Some(slot) = slots.get_mut(index) {
            running = running.saturating_add(delta);
            *slot = Some(running);
            counted += 1;
        }
    }

    let mut last = 0i64;
    let totals_cents = slots
        .into_iter()
        .map(|slot| {
            let value = slot.unwrap_or(last);
            last = value;
            value
        })
        .collect();

    TimeSeries {
        labels,
        totals_cents,
        counted,
    }
}
