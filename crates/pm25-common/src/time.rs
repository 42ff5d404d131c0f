//! Date range handling for satellite requests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Pm25Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors from parsing request dates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("invalid date format: {0}")]
    InvalidFormat(String),

    #[error("start date {start} is after end date {end}")]
    Reversed { start: NaiveDate, end: NaiveDate },
}

impl From<TimeParseError> for Pm25Error {
    fn from(err: TimeParseError) -> Self {
        match err {
            TimeParseError::InvalidFormat(value) => Pm25Error::InvalidDate { value },
            reversed @ TimeParseError::Reversed { .. } => Pm25Error::InvalidParameter {
                param: "end_date".to_string(),
                message: reversed.to_string(),
            },
        }
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TimeParseError> {
        if start > end {
            return Err(TimeParseError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse `YYYY-MM-DD` start and end strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeParseError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Start date without separators, e.g. `20240115`.
    ///
    /// Source rasters are keyed by this value.
    pub fn compact_start(&self) -> String {
        self.start.format("%Y%m%d").to_string()
    }

    /// Number of days covered, inclusive.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.num_days() as usize)
    }
}

/// Parse a single `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, TimeParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| TimeParseError::InvalidFormat(s.to_string()))
}
