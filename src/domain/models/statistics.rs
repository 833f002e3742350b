use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::infrastructure::persistence::entities::OnChainStatus;
use crate::infrastructure::persistence::error::DbError;

/// Date format used by the reporting layer
pub const DAY_FORMAT: &str = "%Y%m%d";

/// Order count and volume for one settlement status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTotals {
    pub status: OnChainStatus,
    pub totals: i64,
    pub total_data_size: i64,
}

impl StatusTotals {
    pub fn empty(status: OnChainStatus) -> Self {
        Self {
            status,
            totals: 0,
            total_data_size: 0,
        }
    }
}

/// A persisted daily rollup as served to reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRollup {
    /// Day in `YYYYMMDD` form
    pub date: String,
    pub result: StatusTotals,
}

/// Inclusive range of days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DbError> {
        if start > end {
            return Err(DbError::InvalidInput(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses a `YYYYMMDD`..`YYYYMMDD` pair
    pub fn parse(start: &str, end: &str) -> Result<Self, DbError> {
        Self::new(parse_day(start)?, parse_day(end)?)
    }
}

/// Half-open instant window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The whole UTC day `date`
    pub fn day(date: NaiveDate) -> Result<Self, DbError> {
        let next = date
            .succ_opt()
            .ok_or_else(|| DbError::InvalidInput(format!("no day after {}", date)))?;
        Ok(Self {
            start: date.and_time(NaiveTime::MIN).and_utc(),
            end: next.and_time(NaiveTime::MIN).and_utc(),
        })
    }

    /// First day touched by the window
    pub fn start_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// First day at or after the window end that is not covered by it
    pub fn end_day(&self) -> NaiveDate {
        let day = self.end.date_naive();
        if self.end.time() == NaiveTime::MIN {
            day
        } else {
            day.succ_opt().unwrap_or(day)
        }
    }
}

pub fn parse_day(value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, DAY_FORMAT)
        .map_err(|e| DbError::InvalidInput(format!("bad date '{}': {}", value, e)))
}

pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}
