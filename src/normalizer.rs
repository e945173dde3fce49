// 🧹 Day Normalizer
// Records → one canonical cell per grid step, per court, per date

use crate::schedule::{CanonicalCell, CourtId, CourtStatus, FacilityGrid, TimeSlotRecord};
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeMap;

pub struct DayNormalizer {
    grid: FacilityGrid,
}

impl DayNormalizer {
    pub fn new(grid: FacilityGrid) -> Self {
        DayNormalizer { grid }
    }

    /// Expand every record over `[start, end]` on the grid
    ///
    /// Later records overwrite earlier ones on the same (date, court, timestamp).
    /// The closing boundary cell is dropped. Output is ordered by (date, court, timestamp).
    pub fn normalize(&self, records: &[TimeSlotRecord]) -> Vec<CanonicalCell> {
        let mut cells: BTreeMap<(NaiveDate, CourtId, NaiveTime), CourtStatus> = BTreeMap::new();

        for record in records {
            for timestamp in self.expand(record.start, record.end) {
                cells.insert((record.date, record.court, timestamp), record.status);
            }
        }

        let before = cells.len();
        let canonical: Vec<CanonicalCell> = cells
            .into_iter()
            .filter(|((_, _, timestamp), _)| *timestamp != self.grid.closing_time)
            .map(|((date, court, timestamp), status)| CanonicalCell {
                timestamp,
                status,
                court,
                date,
            })
            .collect();

        log::debug!(
            "normalized {} records into {} cells ({} closing boundary cells dropped)",
            records.len(),
            canonical.len(),
            before - canonical.len()
        );
        canonical
    }

    /// Grid boundaries from `start` to `end`, both inclusive
    fn expand(&self, start: NaiveTime, end: NaiveTime) -> Vec<NaiveTime> {
        let mut times = Vec::new();
        let mut current = Some(start);
        while let Some(time) = current {
            if time > end {
                break;
            }
            times.push(time);
            current = self.grid.next(time);
        }
        times
    }
}
