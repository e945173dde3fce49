// Court Slots - Core Library
// Scraped half-hour occupancy grid → free intervals → fixed-duration bookable slots
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod schedule;       // Typed records for every pipeline stage
pub mod config;         // Facility defaults + TOML overrides
pub mod parser;         // Grid parser + RawRecordBuilder
pub mod normalizer;     // DayNormalizer
pub mod merger;         // IntervalMerger
pub mod slicer;         // SlotSlicer
pub mod period;         // today / tomorrow / week / 2weeks, explicit ranges
pub mod fetch;          // HTTP + saved-page fetchers
pub mod aggregator;     // DateRangeAggregator
pub mod export;         // CSV / JSON side artifacts

// Re-export commonly used types
pub use error::{Result, ScheduleError};
pub use schedule::{
    AvailabilityInterval, BookableSlot, CanonicalCell, CourtId, CourtStatus,
    FacilityGrid, SlotDuration, TimeSlotRecord,
};
pub use config::{FacilityConfig, StatusVocabulary};
pub use parser::{GridParser, HtmlGridParser, RawCell, RawRecordBuilder};
pub use normalizer::DayNormalizer;
pub use merger::IntervalMerger;
pub use slicer::{slice_all, slice_interval};
pub use period::{DateRange, Period};
pub use fetch::{DirectoryFetcher, HttpFetcher, ScheduleFetcher};
pub use aggregator::{AvailabilityReport, DateRangeAggregator, DayOutcome};
pub use export::{export_to_path, report_json, write_csv, write_json, ExportFormat};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Aggregator wired to the live widget: HTTP fetch + HTML grid parser
pub fn live_aggregator(config: &FacilityConfig) -> anyhow::Result<DateRangeAggregator> {
    let fetcher = HttpFetcher::new(config)?;
    let parser = HtmlGridParser::from_config(config);
    DateRangeAggregator::new(config, Box::new(fetcher), Box::new(parser))
}

/// Aggregator over saved widget pages in `dir` (one DD-MM-YYYY.html per date)
pub fn offline_aggregator(config: &FacilityConfig, dir: &std::path::Path) -> anyhow::Result<DateRangeAggregator> {
    let fetcher = DirectoryFetcher::new(dir);
    let parser = HtmlGridParser::from_config(config);
    DateRangeAggregator::new(config, Box::new(fetcher), Box::new(parser))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    // Two courts, the second one opening with a closed cell; legend tooltip first
    const PAGE: &str = r#"
        <html><body>
          <div class="tooltip" title="Legenda: Volno / Obsazeno"></div>
          <table>
            <tr>
              <td class="empty tooltip" title="20:00–20:30 - Volno"></td>
              <td class="empty tooltip" title="20:30–21:00 - Volno"></td>
              <td class="booked tooltip" title="21:00–22:00 - Novák"></td>
            </tr>
            <tr>
              <td class="tooltip" title="20:00–20:30Zavřeno"></td>
              <td class="empty tooltip" title="20:30–21:00 - Volno"></td>
              <td class="empty tooltip" title="21:00–21:30 - Volno"></td>
              <td class="empty tooltip" title="21:30–22:00 - Volno"></td>
            </tr>
          </table>
        </body></html>
    "#;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_offline_pipeline_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("09-11-2023.html"), PAGE).unwrap();

        let date = NaiveDate::from_ymd_opt(2023, 11, 9).unwrap();
        let range = DateRange::new(date, date).unwrap();
        let aggregator = offline_aggregator(&FacilityConfig::default(), dir.path()).unwrap();
        let report = aggregator.run(&range, &[60]).unwrap();

        let intervals: Vec<(u32, NaiveTime, NaiveTime)> =
            report.intervals.iter().map(|i| (i.court.0, i.start, i.end)).collect();
        assert_eq!(intervals, vec![(1, t(20, 0), t(21, 0)), (2, t(20, 30), t(22, 0))]);

        let slots: Vec<(u32, NaiveTime)> = report.slots.iter().map(|s| (s.court.0, s.start)).collect();
        assert_eq!(slots, vec![(1, t(20, 0)), (2, t(20, 30))]);
        assert!(report.is_complete());
    }
}
