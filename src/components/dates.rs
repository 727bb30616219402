use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::errors::{ConfigurationError, Result};

/// Half open acquisition window `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            Err(ConfigurationError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            })?
        }
        Ok(Self { start, end })
    }

    /// `[date, date + 1 day)`.
    pub fn day(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        Self {
            start,
            end: start + TimeDelta::days(1),
        }
    }

    /// From the first day up to, not including, the last day.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Result<Self> {
        Self::new(
            first.and_time(NaiveTime::MIN).and_utc(),
            last.and_time(NaiveTime::MIN).and_utc(),
        )
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, time: &DateTime<Utc>) -> bool {
        (self.start..self.end).contains(time)
    }
}
