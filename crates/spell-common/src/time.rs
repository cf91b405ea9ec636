//! Calendar handling for daily sea surface temperature series.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Calendar day of year, 1-based.
///
/// Follows the calendar ordinal: on leap years Feb 29 is day 60 and Dec 31 is
/// day 366, on common years Mar 1 is day 60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct DayOfYear(u16);

impl DayOfYear {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 366;

    pub fn new(day: u16) -> GridResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&day) {
            Ok(Self(day))
        } else {
            Err(GridError::InvalidDayOfYear(day))
        }
    }

    /// Day of year of a calendar date.
    pub fn of(date: NaiveDate) -> Self {
        // ordinal() is always within 1..=366
        Self(date.ordinal() as u16)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// All days of a full leap-year climatology, 1..=366.
    pub fn all() -> impl Iterator<Item = DayOfYear> {
        (Self::MIN..=Self::MAX).map(DayOfYear)
    }
}

impl TryFrom<u16> for DayOfYear {
    type Error = GridError;

    fn try_from(day: u16) -> Result<Self, Self::Error> {
        Self::new(day)
    }
}

impl From<DayOfYear> for u16 {
    fn from(day: DayOfYear) -> Self {
        day.0
    }
}

impl std::fmt::Display for DayOfYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// Parse a calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`
/// timestamps. Time-of-day is discarded; daily products stamp the day.
pub fn parse_date(s: &str) -> GridResult<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ndt.date());
    }

    Err(GridError::InvalidDate(s.to_string()))
}

/// `periods` consecutive days ending at `end` (inclusive), oldest first.
pub fn daily_range(end: NaiveDate, periods: usize) -> Vec<NaiveDate> {
    (0..periods)
        .rev()
        .map(|back| end - Duration::days(back as i64))
        .collect()
}

/// Whether `next` is the calendar day right after `previous`.
pub fn is_next_day(previous: NaiveDate, next: NaiveDate) -> bool {
    previous.succ_opt() == Some(next)
}
