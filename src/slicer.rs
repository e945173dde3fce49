// ✂️ Slot Slicer
// Free interval → consecutive fixed-duration offers, remainder dropped

use crate::schedule::{add_minutes, AvailabilityInterval, BookableSlot, SlotDuration};

/// Greedily cut `interval` into `[s, s + d)` slots starting at `interval.start`
///
/// A remainder shorter than `d` is not bookable and is dropped; a duration longer
/// than the interval gives no slots.
pub fn slice_interval(interval: &AvailabilityInterval, duration: SlotDuration) -> Vec<BookableSlot> {
    let step = i64::from(duration.minutes());
    let mut slots = Vec::new();
    let mut start = interval.start;

    while let Some(end) = add_minutes(start, step) {
        if end > interval.end {
            break;
        }
        slots.push(BookableSlot {
            start,
            end,
            court: interval.court,
            date: interval.date,
            duration: duration.minutes(),
        });
        start = end;
    }

    slots
}

/// Slice every interval at every duration, ordered by (date, court, start, duration)
pub fn slice_all(intervals: &[AvailabilityInterval], durations: &[SlotDuration]) -> Vec<BookableSlot> {
    let mut slots: Vec<BookableSlot> = intervals
        .iter()
        .flat_map(|interval| durations.iter().flat_map(move |&d| slice_interval(interval, d)))
        .collect();
    slots.sort_by_key(|s| (s.date, s.court, s.start, s.duration));
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{minutes_of_day, CourtId};
    use chrono::{NaiveDate, NaiveTime};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn interval(start: NaiveTime, end: NaiveTime) -> AvailabilityInterval {
        AvailabilityInterval {
            start,
            end,
            court: CourtId(1),
            date: NaiveDate::from_ymd_opt(2023, 11, 9).unwrap(),
        }
    }

    fn d(minutes: i64) -> SlotDuration {
        SlotDuration::new(minutes).unwrap()
    }

    #[test]
    fn test_exact_fit() {
        let slots = slice_interval(&interval(t(8, 0), t(9, 0)), d(30));
        assert_eq!(slots.len(), 2);
        assert_eq!((slots[0].start, slots[0].end), (t(8, 0), t(8, 30)));
        assert_eq!((slots[1].start, slots[1].end), (t(8, 30), t(9, 0)));
    }

    #[test]
    fn test_remainder_dropped() {
        // 70 minutes at 30 → two slots, 10 minutes left over
        let slots = slice_interval(&interval(t(8, 0), t(9, 10)), d(30));
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].end, t(9, 0));

        let slots = slice_interval(&interval(t(8, 0), t(10, 0)), d(90));
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].end, t(9, 30));
    }

    #[test]
    fn test_duration_longer_than_interval() {
        assert!(slice_interval(&interval(t(8, 0), t(8, 30)), d(60)).is_empty());
    }

    #[test]
    fn test_slots_are_exact_contained_and_ordered() {
        let source = interval(t(10, 0), t(14, 30));
        let slots = slice_interval(&source, d(45));
        assert_eq!(slots.len(), 6);
        for slot in &slots {
            assert_eq!(minutes_of_day(slot.end) - minutes_of_day(slot.start), 45);
            assert!(slot.start >= source.start && slot.end <= source.end);
            assert_eq!(slot.duration, 45);
        }
        for pair in slots.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_slice_near_midnight_does_not_wrap() {
        let slots = slice_interval(&interval(t(23, 0), t(23, 30)), d(60));
        assert!(slots.is_empty());
    }

    #[test]
    fn test_slice_all_orders_by_court_then_start() {
        let mut second_court = interval(t(8, 0), t(9, 0));
        second_court.court = CourtId(2);
        let intervals = vec![second_court, interval(t(12, 0), t(13, 0)), interval(t(8, 0), t(9, 0))];

        let slots = slice_all(&intervals, &[d(60), d(30)]);
        let keys: Vec<(u32, NaiveTime, u32)> = slots.iter().map(|s| (s.court.0, s.start, s.duration)).collect();
        assert_eq!(
            keys,
            vec![
                (1, t(8, 0), 30),
                (1, t(8, 0), 60),
                (1, t(8, 30), 30),
                (1, t(12, 0), 30),
                (1, t(12, 0), 60),
                (1, t(12, 30), 30),
                (2, t(8, 0), 30),
                (2, t(8, 0), 60),
                (2, t(8, 30), 30),
            ]
        );
    }
}
