// 📊 Date Range Aggregator
// Runs fetch → parse → build → normalize → merge → slice once per date
//
// Request errors (bad range, bad duration) abort before any fetch.
// Date errors (fetch, parse) are recorded per date and never stop the other dates.

use crate::config::FacilityConfig;
use crate::error::{Result, ScheduleError};
use crate::fetch::ScheduleFetcher;
use crate::merger::IntervalMerger;
use crate::normalizer::DayNormalizer;
use crate::parser::{GridParser, RawRecordBuilder};
use crate::period::DateRange;
use crate::schedule::{format_date, AvailabilityInterval, BookableSlot, CourtId, SlotDuration};
use crate::slicer::slice_all;
use chrono::NaiveDate;
use std::collections::BTreeMap;

// ============================================================================
// REPORT
// ============================================================================

/// Outcome of one date's pipeline run
#[derive(Debug)]
pub enum DayOutcome {
    Computed {
        intervals: Vec<AvailabilityInterval>,
        slots: Vec<BookableSlot>,
    },
    /// The widget returned no cells: no data, zero slots
    Empty,
    Failed(ScheduleError),
}

/// Aggregated result over a date range
#[derive(Debug, Default)]
pub struct AvailabilityReport {
    pub dates: Vec<NaiveDate>,
    pub durations: Vec<SlotDuration>,
    /// Ordered by (date, court, start, duration)
    pub slots: Vec<BookableSlot>,
    pub intervals: Vec<AvailabilityInterval>,
    pub empty_dates: Vec<NaiveDate>,
    pub failures: BTreeMap<NaiveDate, ScheduleError>,
}

impl AvailabilityReport {
    fn absorb(mut self, date: NaiveDate, outcome: DayOutcome) -> Self {
        self.dates.push(date);
        match outcome {
            DayOutcome::Computed { intervals, slots } => {
                self.intervals.extend(intervals);
                self.slots.extend(slots);
            }
            DayOutcome::Empty => self.empty_dates.push(date),
            DayOutcome::Failed(err) => {
                self.failures.insert(date, err);
            }
        }
        self
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn slots_for(&self, duration: SlotDuration) -> impl Iterator<Item = &BookableSlot> {
        self.slots.iter().filter(move |s| s.duration == duration.minutes())
    }

    /// Slot count per (date, court, duration)
    pub fn summary(&self) -> BTreeMap<(NaiveDate, CourtId, u32), usize> {
        let mut counts = BTreeMap::new();
        for slot in &self.slots {
            *counts.entry((slot.date, slot.court, slot.duration)).or_insert(0) += 1;
        }
        counts
    }
}

// ============================================================================
// AGGREGATOR
// ============================================================================

pub struct DateRangeAggregator {
    fetcher: Box<dyn ScheduleFetcher>,
    parser: Box<dyn GridParser>,
    builder: RawRecordBuilder,
    normalizer: DayNormalizer,
    merger: IntervalMerger,
}

impl DateRangeAggregator {
    pub fn new(
        config: &FacilityConfig,
        fetcher: Box<dyn ScheduleFetcher>,
        parser: Box<dyn GridParser>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let grid = config.grid()?;
        Ok(DateRangeAggregator {
            fetcher,
            parser,
            builder: RawRecordBuilder::from_config(config)?,
            normalizer: DayNormalizer::new(grid),
            merger: IntervalMerger::new(grid),
        })
    }

    /// Validate the request, then run every date of `range`
    pub fn run(&self, range: &DateRange, durations: &[i64]) -> Result<AvailabilityReport> {
        let durations = SlotDuration::parse_set(durations)?;
        Ok(self.run_dates(&range.dates(), &durations))
    }

    /// Run an arbitrary set of dates; output order does not depend on input order
    pub fn run_dates(&self, dates: &[NaiveDate], durations: &[SlotDuration]) -> AvailabilityReport {
        let mut dates = dates.to_vec();
        dates.sort();
        dates.dedup();

        let initial = AvailabilityReport {
            durations: durations.to_vec(),
            ..AvailabilityReport::default()
        };
        let report = dates
            .iter()
            .map(|&date| (date, self.run_date(date, durations)))
            .fold(initial, |report, (date, outcome)| report.absorb(date, outcome));

        log::info!(
            "{} dates: {} slots, {} empty, {} failed",
            report.dates.len(),
            report.slots.len(),
            report.empty_dates.len(),
            report.failures.len()
        );
        report
    }

    /// Whole pipeline for one date
    pub fn run_date(&self, date: NaiveDate, durations: &[SlotDuration]) -> DayOutcome {
        match self.compute(date, durations) {
            Ok((intervals, slots)) => DayOutcome::Computed { intervals, slots },
            Err(ScheduleError::EmptySchedule) => {
                log::info!("{}: no cells in schedule", format_date(date));
                DayOutcome::Empty
            }
            Err(err) => {
                log::warn!("{}: {}", format_date(date), err);
                DayOutcome::Failed(err)
            }
        }
    }

    fn compute(
        &self,
        date: NaiveDate,
        durations: &[SlotDuration],
    ) -> Result<(Vec<AvailabilityInterval>, Vec<BookableSlot>)> {
        let markup = self.fetcher.fetch(date)?;
        let cells = self.parser.parse(&markup)?;
        let records = self.builder.build(date, &cells)?;
        let canonical = self.normalizer.normalize(&records);
        let intervals = self.merger.merge(&canonical);
        let slots = slice_all(&intervals, durations);

        log::debug!(
            "{}: {} free intervals ({} min), {} slots",
            format_date(date),
            intervals.len(),
            intervals.iter().map(AvailabilityInterval::minutes).sum::<i64>(),
            slots.len()
        );
        Ok((intervals, slots))
    }
}
