// 🗓️ Schedule Model - typed records for every pipeline stage
// raw cell → TimeSlotRecord → CanonicalCell → AvailabilityInterval → BookableSlot

use crate::error::{Result, ScheduleError};
use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used by the booking widget, the CLI and the exports
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Time-of-day format used in cell labels and exports
pub const TIME_FORMAT: &str = "%H:%M";

// ============================================================================
// STATUS & COURT
// ============================================================================

/// Occupancy of one half-hour cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourtStatus {
    Free,
    Booked,
    Closed,
}

impl CourtStatus {
    pub fn is_free(&self) -> bool {
        matches!(self, CourtStatus::Free)
    }
}

impl fmt::Display for CourtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CourtStatus::Free => "free",
            CourtStatus::Booked => "booked",
            CourtStatus::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// 1-based court number, in the order the widget renders the courts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourtId(pub u32);

impl fmt::Display for CourtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// FACILITY GRID
// ============================================================================

/// Time grid of the facility: cell size and the closing boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacilityGrid {
    pub step_minutes: u32,
    pub closing_time: NaiveTime,
}

impl Default for FacilityGrid {
    fn default() -> Self {
        FacilityGrid {
            step_minutes: 30,
            closing_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
        }
    }
}

impl FacilityGrid {
    pub fn step(&self) -> Duration {
        Duration::minutes(i64::from(self.step_minutes))
    }

    /// Whether `time` sits on a cell boundary
    pub fn is_aligned(&self, time: NaiveTime) -> bool {
        let minutes = time.hour() * 60 + time.minute();
        self.step_minutes > 0 && time.second() == 0 && minutes % self.step_minutes == 0
    }

    /// `time + step`, or None when it would roll past midnight
    pub fn next(&self, time: NaiveTime) -> Option<NaiveTime> {
        add_minutes(time, i64::from(self.step_minutes))
    }
}

/// Add minutes to a time of day without wrapping around midnight
pub fn add_minutes(time: NaiveTime, minutes: i64) -> Option<NaiveTime> {
    let (next, wrapped) = time.overflowing_add_signed(Duration::minutes(minutes));
    if wrapped == 0 {
        Some(next)
    } else {
        None
    }
}

/// Minutes from midnight, handy for arithmetic on slot boundaries
pub fn minutes_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour() * 60 + time.minute())
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        ScheduleError::InvalidDateRange(format!("'{}' is not a DD-MM-YYYY date: {}", value, e))
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ============================================================================
// PIPELINE RECORDS
// ============================================================================

/// One scraped cell, already decoded: produced by the record builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlotRecord {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub status: CourtStatus,
    pub court: CourtId,
    pub date: NaiveDate,
}

/// One half-hour cell per (timestamp, court, date)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalCell {
    pub timestamp: NaiveTime,
    pub status: CourtStatus,
    pub court: CourtId,
    pub date: NaiveDate,
}

/// Maximal run of free cells on one court and date, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailabilityInterval {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub court: CourtId,
    #[serde(with = "dmy")]
    pub date: NaiveDate,
}

impl AvailabilityInterval {
    pub fn minutes(&self) -> i64 {
        minutes_of_day(self.end) - minutes_of_day(self.start)
    }

    /// Expand back into free canonical cells on `grid` (end exclusive)
    pub fn cells(&self, grid: &FacilityGrid) -> Vec<CanonicalCell> {
        let mut cells = Vec::new();
        let mut current = Some(self.start);
        while let Some(timestamp) = current {
            if timestamp >= self.end {
                break;
            }
            cells.push(CanonicalCell {
                timestamp,
                status: CourtStatus::Free,
                court: self.court,
                date: self.date,
            });
            current = grid.next(timestamp);
        }
        cells
    }
}

/// Offer of exactly `duration` minutes inside one availability interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookableSlot {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub court: CourtId,
    #[serde(with = "dmy")]
    pub date: NaiveDate,
    pub duration: u32,
}

/// Requested slot length in minutes, always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SlotDuration(u32);

impl SlotDuration {
    pub fn new(minutes: i64) -> Result<Self> {
        if minutes <= 0 {
            return Err(ScheduleError::InvalidDuration(format!(
                "{} minutes (must be positive)",
                minutes
            )));
        }
        let minutes = u32::try_from(minutes)
            .map_err(|_| ScheduleError::InvalidDuration(format!("{} minutes (too large)", minutes)))?;
        Ok(SlotDuration(minutes))
    }

    /// Validate a whole request: at least one duration, all positive, no repeats
    pub fn parse_set(values: &[i64]) -> Result<Vec<SlotDuration>> {
        if values.is_empty() {
            return Err(ScheduleError::InvalidDuration(
                "at least one slot duration is required".to_string(),
            ));
        }
        let mut durations = values
            .iter()
            .map(|&m| SlotDuration::new(m))
            .collect::<Result<Vec<_>>>()?;
        durations.sort();
        durations.dedup();
        Ok(durations)
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SlotDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}

// ============================================================================
// SERDE HELPERS
// ============================================================================

pub(crate) mod hhmm {
    use super::TIME_FORMAT;
    use chrono::NaiveTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
    }
}

pub(crate) mod dmy {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }
}
