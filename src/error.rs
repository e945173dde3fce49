// ⚠️ Schedule Errors
// Request-level errors abort the whole query; date-level errors are collected per date

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScheduleError>;

#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Transport failure or non-success HTTP status for one date
    #[error("fetch failed for {date}: {message}")]
    Fetch { date: NaiveDate, message: String },

    /// Markup or cell label did not have the expected structure
    #[error("parse error: {0}")]
    Parse(String),

    /// Zero cells for a date ("no data", never a hard failure)
    #[error("schedule contains no cells")]
    EmptySchedule,

    /// End before start, or a date that does not match DD-MM-YYYY
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),

    /// Zero or negative slot duration, or no duration at all
    #[error("invalid slot duration: {0}")]
    InvalidDuration(String),
}

impl ScheduleError {
    /// Date-level errors are isolated per date; everything else is a malformed request
    pub fn is_date_level(&self) -> bool {
        matches!(
            self,
            ScheduleError::Fetch { .. } | ScheduleError::Parse(_) | ScheduleError::EmptySchedule
        )
    }

    /// Short machine-friendly kind, used in JSON reports
    pub fn kind(&self) -> &'static str {
        match self {
            ScheduleError::Fetch { .. } => "fetch",
            ScheduleError::Parse(_) => "parse",
            ScheduleError::EmptySchedule => "empty_schedule",
            ScheduleError::InvalidDateRange(_) => "invalid_date_range",
            ScheduleError::InvalidDuration(_) => "invalid_duration",
        }
    }
}
