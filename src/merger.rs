// 🔗 Interval Merger
// Canonical cells → maximal free intervals, one (date, court) group at a time
//
// Finite-state machine per group:
//   NoRun ──cell──▶ InRun(status)
//   InRun(s) ──cell with other status, or grid gap──▶ close run, InRun(new)
//   end of group ──▶ close the open run
// Only runs with status Free are emitted.

use crate::schedule::{AvailabilityInterval, CanonicalCell, CourtId, CourtStatus, FacilityGrid};
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    NoRun,
    InRun {
        start: NaiveTime,
        last: NaiveTime,
        status: CourtStatus,
    },
}

pub struct IntervalMerger {
    grid: FacilityGrid,
}

impl IntervalMerger {
    pub fn new(grid: FacilityGrid) -> Self {
        IntervalMerger { grid }
    }

    /// Free intervals ordered by (date, court, start)
    pub fn merge(&self, cells: &[CanonicalCell]) -> Vec<AvailabilityInterval> {
        let mut groups: BTreeMap<(NaiveDate, CourtId), Vec<CanonicalCell>> = BTreeMap::new();
        for cell in cells {
            groups.entry((cell.date, cell.court)).or_default().push(*cell);
        }

        groups
            .into_iter()
            .flat_map(|((date, court), mut group)| {
                group.sort_by_key(|c| c.timestamp);
                self.merge_group(date, court, &group)
            })
            .collect()
    }

    /// Run the state machine over one group, cells sorted by timestamp
    fn merge_group(&self, date: NaiveDate, court: CourtId, cells: &[CanonicalCell]) -> Vec<AvailabilityInterval> {
        let mut intervals = Vec::new();
        let mut state = RunState::NoRun;

        for cell in cells {
            state = match state {
                RunState::NoRun => RunState::InRun {
                    start: cell.timestamp,
                    last: cell.timestamp,
                    status: cell.status,
                },
                RunState::InRun { start, last, status } => {
                    let last_end = self.grid.next(last);
                    if last_end != Some(cell.timestamp) {
                        // gap in the grid: the run ends where its last cell ends
                        self.close_run(start, last_end, status, court, date, &mut intervals);
                        RunState::InRun {
                            start: cell.timestamp,
                            last: cell.timestamp,
                            status: cell.status,
                        }
                    } else if cell.status != status {
                        self.close_run(start, Some(cell.timestamp), status, court, date, &mut intervals);
                        RunState::InRun {
                            start: cell.timestamp,
                            last: cell.timestamp,
                            status: cell.status,
                        }
                    } else {
                        RunState::InRun {
                            start,
                            last: cell.timestamp,
                            status,
                        }
                    }
                }
            };
        }

        // the final run closes on this group's own last cell
        if let RunState::InRun { start, last, status } = state {
            self.close_run(start, self.grid.next(last), status, court, date, &mut intervals);
        }

        intervals
    }

    fn close_run(
        &self,
        start: NaiveTime,
        end: Option<NaiveTime>,
        status: CourtStatus,
        court: CourtId,
        date: NaiveDate,
        out: &mut Vec<AvailabilityInterval>,
    ) {
        if !status.is_free() {
            return;
        }
        match end {
            Some(end) if end > start => out.push(AvailabilityInterval { start, end, court, date }),
            _ => log::warn!("{} court {}: free run from {} has no representable end, skipped", date, court, start),
        }
    }
}
