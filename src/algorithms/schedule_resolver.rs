use chrono::NaiveTime;
use rayon::prelude::*;
use std::cmp::Reverse;
use tracing::{debug, warn};

use crate::error::ScheduleError;
use crate::models::{DeliveryRecord, RejectedRecord, ScheduledStop, TimeWindow};

/// Result of resolving one batch of records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Stops in visiting order, windows non-overlapping
    pub stops: Vec<ScheduledStop>,

    /// Records that could not be placed
    pub rejected: Vec<RejectedRecord>,
}

/// Greedy single-pass overlap resolver.
///
/// Stops are ordered by declared start, wider windows first on equal starts,
/// then by input position. Each stop starting before the previous resolved end
/// is pushed forward to that end, keeping its duration. Earlier stops are never
/// revisited.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleResolver {
    /// Optional working-day bound; midnight always applies
    day_end: Option<NaiveTime>,
}

impl ScheduleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects stops whose shifted window would end after `day_end`
    pub fn with_day_end(day_end: Option<NaiveTime>) -> Self {
        Self { day_end }
    }

    /// Parses, orders and de-overlaps the given records
    pub fn resolve(&self, records: &[DeliveryRecord]) -> Resolution {
        if records.is_empty() {
            return Resolution::default();
        }

        let parsed: Vec<(usize, Result<TimeWindow, ScheduleError>)> = records
            .par_iter()
            .enumerate()
            .map(|(index, record)| (index, TimeWindow::parse(&record.time_slot)))
            .collect();

        let mut rejected = Vec::new();
        let mut candidates = Vec::with_capacity(parsed.len());
        for (index, result) in parsed {
            match result {
                Ok(window) => candidates.push((index, window)),
                Err(error) => {
                    warn!(record = %records[index].id, %error, "excluding record from schedule");
                    rejected.push(RejectedRecord {
                        record: records[index].clone(),
                        error,
                    });
                }
            }
        }

        // Stable sort keeps input order for full ties
        candidates.sort_by_key(|(_, window)| (window.start(), Reverse(window.duration())));

        let mut stops: Vec<ScheduledStop> = Vec::with_capacity(candidates.len());
        let mut previous_end: Option<NaiveTime> = None;

        for (index, original) in candidates {
            let record = &records[index];

            let window = match previous_end {
                Some(prev_end) if original.start() < prev_end => {
                    match self.shift(&original, prev_end) {
                        Ok(shifted) => {
                            debug!(
                                record = %record.id,
                                from = %original,
                                to = %shifted,
                                "shifted overlapping window"
                            );
                            shifted
                        }
                        Err(error) => {
                            warn!(record = %record.id, %error, "excluding record from schedule");
                            rejected.push(RejectedRecord {
                                record: record.clone(),
                                error,
                            });
                            continue;
                        }
                    }
                }
                _ => original,
            };

            previous_end = Some(window.end());
            stops.push(ScheduledStop {
                record: record.clone(),
                original_window: original,
                window,
                input_index: index,
            });
        }

        Resolution { stops, rejected }
    }

    fn shift(&self, original: &TimeWindow, start: NaiveTime) -> Result<TimeWindow, ScheduleError> {
        let past_day_end = |limit: String| ScheduleError::PastDayEnd {
            window: original.to_string(),
            limit,
        };

        let shifted = original
            .shifted_to(start)
            .ok_or_else(|| past_day_end("midnight".to_string()))?;

        match self.day_end {
            Some(day_end) if shifted.end() > day_end => {
                Err(past_day_end(day_end.format("%H:%M").to_string()))
            }
            _ => Ok(shifted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn records(slots: &[&str]) -> Vec<DeliveryRecord> {
        slots
            .iter()
            .enumerate()
            .map(|(i, slot)| DeliveryRecord::new(format!("B-{}", i), format!("Addr {}", i), slot.to_string()))
            .collect()
    }

    fn windows(resolution: &Resolution) -> Vec<String> {
        resolution.stops.iter().map(|s| s.window.to_string()).collect()
    }

    fn ids(resolution: &Resolution) -> Vec<&str> {
        resolution.stops.iter().map(|s| s.record.id.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        let resolution = ScheduleResolver::new().resolve(&[]);

        assert!(resolution.stops.is_empty());
        assert!(resolution.rejected.is_empty());
    }

    #[test]
    fn test_overlap_is_shifted() {
        let input = records(&["10:00 AM - 10:30 AM", "10:15 AM - 10:45 AM"]);
        let resolution = ScheduleResolver::new().resolve(&input);

        assert_eq!(
            windows(&resolution),
            vec!["10:00 AM - 10:30 AM", "10:30 AM - 11:00 AM"]
        );
        assert!(!resolution.stops[0].is_shifted());
        assert!(resolution.stops[1].is_shifted());
    }

    #[test]
    fn test_non_overlapping_unchanged() {
        let input = records(&[
            "09:00 AM - 09:30 AM",
            "10:00 AM - 10:45 AM",
            "01:00 PM - 01:20 PM",
        ]);
        let resolution = ScheduleResolver::new().resolve(&input);

        assert_eq!(ids(&resolution), vec!["B-0", "B-1", "B-2"]);
        for stop in &resolution.stops {
            assert_eq!(stop.window, stop.original_window);
        }
    }

    #[test]
    fn test_sorted_by_start() {
        let input = records(&[
            "02:00 PM - 02:30 PM",
            "09:00 AM - 09:30 AM",
            "11:00 AM - 11:15 AM",
        ]);
        let resolution = ScheduleResolver::new().resolve(&input);

        assert_eq!(ids(&resolution), vec!["B-1", "B-2", "B-0"]);
    }

    #[test]
    fn test_equal_start_prefers_longer_window() {
        let input = records(&[
            "10:00 AM - 10:20 AM",
            "10:00 AM - 11:00 AM",
            "10:00 AM - 10:20 AM",
        ]);
        let resolution = ScheduleResolver::new().resolve(&input);

        assert_eq!(ids(&resolution), vec!["B-1", "B-0", "B-2"]);
        assert_eq!(
            windows(&resolution),
            vec![
                "10:00 AM - 11:00 AM",
                "11:00 AM - 11:20 AM",
                "11:20 AM - 11:40 AM"
            ]
        );
    }

    #[test]
    fn test_malformed_record_excluded() {
        let input = records(&["10:00 AM - 10:30 AM", "whenever", "11:00 AM - 10:00 AM"]);
        let resolution = ScheduleResolver::new().resolve(&input);

        assert_eq!(ids(&resolution), vec!["B-0"]);
        assert_eq!(resolution.rejected.len(), 2);
        assert!(resolution
            .rejected
            .iter()
            .all(|r| matches!(r.error, ScheduleError::MalformedWindow { .. })));
    }

    #[test]
    fn test_shift_past_midnight_rejected() {
        let input = records(&[
            "10:00 PM - 11:30 PM",
            "10:30 PM - 11:00 PM",
            "11:35 PM - 11:50 PM",
        ]);
        let resolution = ScheduleResolver::new().resolve(&input);

        assert_eq!(ids(&resolution), vec!["B-0", "B-2"]);
        assert!(matches!(
            resolution.rejected[0].error,
            ScheduleError::PastDayEnd { .. }
        ));
    }

    #[test]
    fn test_day_end_bound() {
        let day_end = NaiveTime::from_hms_opt(18, 0, 0);
        let input = records(&["05:00 PM - 05:45 PM", "05:30 PM - 06:00 PM"]);
        let resolution = ScheduleResolver::with_day_end(day_end).resolve(&input);

        assert_eq!(ids(&resolution), vec!["B-0"]);
        assert_eq!(resolution.rejected.len(), 1);

        let unbounded = ScheduleResolver::new().resolve(&input);
        assert_eq!(windows(&unbounded)[1], "05:45 PM - 06:15 PM");
    }

    #[test]
    fn test_random_batches_hold_invariants() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let count = rng.gen_range(0..25);
            let slots: Vec<String> = (0..count)
                .map(|_| {
                    let start = rng.gen_range(8 * 60..16 * 60);
                    let length = rng.gen_range(5..90);
                    let s = NaiveTime::from_hms_opt(start / 60, start % 60, 0).unwrap();
                    let e = NaiveTime::from_hms_opt((start + length) / 60, (start + length) % 60, 0)
                        .unwrap();
                    TimeWindow::new(s, e).unwrap().to_string()
                })
                .collect();
            let slot_refs: Vec<&str> = slots.iter().map(String::as_str).collect();
            let resolution = ScheduleResolver::new().resolve(&records(&slot_refs));

            assert_eq!(resolution.stops.len() + resolution.rejected.len(), count as usize);
            for stop in &resolution.stops {
                assert_eq!(stop.window.duration(), stop.original_window.duration());
                assert!(stop.window.start() >= stop.original_window.start());
            }
            for pair in resolution.stops.windows(2) {
                assert!(pair[0].window.end() <= pair[1].window.start());
            }
        }
    }
}
