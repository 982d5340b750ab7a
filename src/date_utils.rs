use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{AppError, AppResult};

/// The single timezone in which instants are given a civil-calendar meaning
/// (hour of day, weekday, day of month).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTz(Tz);

impl ReferenceTz {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn utc() -> Self {
        Self(chrono_tz::UTC)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn local(&self, ts: DateTime<Utc>) -> DateTime<Tz> {
        ts.with_timezone(&self.0)
    }

    pub fn date_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        self.local(ts).date_naive()
    }

    /// First instant of `date` in this timezone.
    ///
    /// Midnight can fall into a DST gap in a few zones; the first valid
    /// instant of the day is used then.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        if let Some(ts) = self.0.from_local_datetime(&midnight).earliest() {
            return ts.with_timezone(&Utc);
        }
        (1..=3)
            .filter_map(|h| {
                let shifted = midnight + Duration::hours(h);
                self.0.from_local_datetime(&shifted).earliest()
            })
            .map(|ts| ts.with_timezone(&Utc))
            .next()
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }

    /// Last millisecond of `date` in this timezone.
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        match date.succ_opt() {
            Some(next) => self.start_of_day(next) - Duration::milliseconds(1),
            None => DateTime::<Utc>::MAX_UTC,
        }
    }
}

impl Default for ReferenceTz {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Display for ReferenceTz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReferenceTz {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("utc") {
            return Ok(Self::utc());
        }
        trimmed.parse::<Tz>().map(Self).map_err(|_| {
            AppError::InvalidQuery(format!(
                "Unknown timezone '{}' (expected an IANA name such as America/New_York)",
                trimmed
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    Today,
    ThisWeek,
    ThisMonth,
    Trailing30Days,
    All,
}

impl FromStr for RangePreset {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "today" | "day" => Ok(Self::Today),
            "this-week" | "week" => Ok(Self::ThisWeek),
            "this-month" | "month" => Ok(Self::ThisMonth),
            "trailing-30-days" | "last-30-days" => Ok(Self::Trailing30Days),
            "all" => Ok(Self::All),
            _ => Err(AppError::InvalidQuery(format!(
                "Unknown range '{}'. Use: today, this-week, this-month, trailing-30-days, all",
                s
            ))),
        }
    }
}

impl RangePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::ThisWeek => "this-week",
            Self::ThisMonth => "this-month",
            Self::Trailing30Days => "trailing-30-days",
            Self::All => "all",
        }
    }
}

/// Inclusive instant range, already clipped so that it never extends past "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub preset: Option<RangePreset>,
}

impl DateRange {
    pub fn from_preset(preset: RangePreset, now: DateTime<Utc>, tz: ReferenceTz) -> Self {
        let today = tz.date_of(now);
        let start = match preset {
            RangePreset::Today => tz.start_of_day(today),
            RangePreset::ThisWeek => tz.start_of_day(week_start(today)),
            RangePreset::ThisMonth => tz.start_of_day(month_start(today)),
            RangePreset::Trailing30Days => tz.start_of_day(today - Duration::days(29)),
            RangePreset::All => return Self::all_time(now).with_preset(preset),
        };
        Self {
            start,
            end: now,
            preset: Some(preset),
        }
    }

    /// Range covering the civil days `from..=to`, clipped to `now`.
    pub fn from_dates(
        from: NaiveDate,
        to: NaiveDate,
        now: DateTime<Utc>,
        tz: ReferenceTz,
    ) -> AppResult<Self> {
        if from > to {
            return Err(AppError::InvalidQuery(format!(
                "Range start {} is after range end {}",
                from, to
            )));
        }
        let start = tz.start_of_day(from);
        if start > now {
            return Err(AppError::InvalidQuery(format!(
                "Range starting {} lies in the future",
                from
            )));
        }
        Ok(Self {
            start,
            end: tz.end_of_day(to).min(now),
            preset: None,
        })
    }

    /// Explicit instant bounds, both inclusive.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            preset: None,
        }
    }

    /// Everything up to and including `end`, however old.
    pub fn all_time(end: DateTime<Utc>) -> Self {
        Self::between(DateTime::<Utc>::MIN_UTC, end)
    }

    fn with_preset(mut self, preset: RangePreset) -> Self {
        self.preset = Some(preset);
        self
    }

    /// Every representable instant.
    pub fn unbounded() -> Self {
        Self::between(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }

    pub fn first_day(&self, tz: ReferenceTz) -> NaiveDate {
        tz.date_of(self.start)
    }

    pub fn last_day(&self, tz: ReferenceTz) -> NaiveDate {
        tz.date_of(self.end)
    }
}

/// Weeks start on Sunday, like the dashboard charts.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_from_sunday = date.weekday().num_days_from_sunday();
    date - Duration::days(days_from_sunday as i64)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Months elapsed from `from`'s month to `to`'s month.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let from_index = from.year() as i64 * 12 + from.month0() as i64;
    let to_index = to.year() as i64 * 12 + to.month0() as i64;
    to_index - from_index
}

pub fn parse_date(label: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::InvalidQuery(format!("Invalid {} date '{}' (expected YYYY-MM-DD)", label, value))
    })
}
