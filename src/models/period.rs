//! Inclusive date ranges and calendar helpers
//!
//! Every range in the budget engine is inclusive at both ends, so a single
//! day has a length of one.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive `[start, end]` range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range; returns `None` when `end` is before `start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    /// The calendar month containing `year`/`month`
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self {
            start,
            end: last_day_of_month(start),
        })
    }

    /// The calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        Self {
            start,
            end: last_day_of_month(date),
        }
    }

    /// Number of days in the range, counting both ends
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Intersection of two ranges, or `None` when they do not touch
    pub fn overlap(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        DateRange::new(start, end)
    }

    /// Parse "YYYY-MM" (a calendar month) or "YYYY-MM-DD..YYYY-MM-DD"
    pub fn parse(s: &str) -> Result<Self, DateRangeParseError> {
        let s = s.trim();
        let invalid = || DateRangeParseError::InvalidFormat(s.to_string());

        if let Some((start, end)) = s.split_once("..") {
            let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
            let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
            return DateRange::new(start, end).ok_or(DateRangeParseError::EndBeforeStart);
        }

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        DateRange::month(year, month).ok_or(DateRangeParseError::InvalidMonth(month))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Last calendar day of the month containing `date`
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    first_day_of_next_month(date) - Duration::days(1)
}

/// First day of the month after the one containing `date`
pub fn first_day_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

/// December 31 of the year containing `date`
pub fn last_day_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(NaiveDate::MAX)
}

/// January 1 of the year after the one containing `date`
pub fn first_day_of_next_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).unwrap_or(NaiveDate::MAX)
}

/// Error type for date range parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRangeParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
    EndBeforeStart,
}

impl fmt::Display for DateRangeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(s) => write!(f, "Invalid date range: {}", s),
            Self::InvalidMonth(m) => write!(f, "Invalid month: {}", m),
            Self::EndBeforeStart => write!(f, "Range end is before its start"),
        }
    }
}

impl std::error::Error for DateRangeParseError {}
