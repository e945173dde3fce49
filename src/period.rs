// 📅 Query Periods
// Named shorthands and explicit DD-MM-YYYY ranges → inclusive list of dates

use crate::error::{Result, ScheduleError};
use crate::schedule::{format_date, parse_date};
use chrono::{Duration, NaiveDate};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Tomorrow,
    Week,
    TwoWeeks,
}

impl Period {
    /// Inclusive range relative to `today`; week and 2weeks count today plus 7 / 14 days
    pub fn range(&self, today: NaiveDate) -> DateRange {
        let (start, days) = match self {
            Period::Today => (today, 0),
            Period::Tomorrow => (today + Duration::days(1), 0),
            Period::Week => (today, 7),
            Period::TwoWeeks => (today, 14),
        };
        DateRange {
            start,
            end: start + Duration::days(days),
        }
    }
}

impl FromStr for Period {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(Period::Today),
            "tomorrow" => Ok(Period::Tomorrow),
            "week" => Ok(Period::Week),
            "2weeks" => Ok(Period::TwoWeeks),
            other => Err(ScheduleError::InvalidDateRange(format!(
                "unknown period '{}' (expected today, tomorrow, week or 2weeks)",
                other
            ))),
        }
    }
}

/// Inclusive span of calendar dates, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(ScheduleError::InvalidDateRange(format!(
                "end {} precedes start {}",
                format_date(end),
                format_date(start)
            )));
        }
        Ok(DateRange { start, end })
    }

    /// Explicit range from DD-MM-YYYY strings; a missing start means today, a missing end is an error
    pub fn parse(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> Result<Self> {
        let start = match start {
            Some(s) => parse_date(s)?,
            None => today,
        };
        let end = end.ok_or_else(|| {
            ScheduleError::InvalidDateRange("an end date in DD-MM-YYYY format is required".to_string())
        })?;
        Self::new(start, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start.iter_days().take_while(|d| *d <= self.end).collect()
    }
}
