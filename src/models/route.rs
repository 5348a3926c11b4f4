// Route models for representing the day's run

use crate::error::ProviderError;
use crate::models::{Coordinate, Geocode, Meters, RejectedRecord, ResolvedStop, Seconds};
use std::fmt;

/// Routed path between two consecutive waypoints of the run
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    /// Position of the segment in the run, 0 starts at the depot
    pub index: usize,
    pub from: Coordinate,
    pub to: Coordinate,

    /// Decoded path geometry
    pub path: Vec<Coordinate>,

    pub distance: Meters,
    pub duration: Seconds,
}

/// A segment the path provider could not deliver
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentFailure {
    pub index: usize,
    pub from: Coordinate,
    pub to: Coordinate,
    pub reason: ProviderError,
}

/// Distance and duration totals across a run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RouteTotals {
    pub distance: Meters,
    pub duration: Seconds,
}

impl RouteTotals {
    pub fn add(&mut self, segment: &RouteSegment) {
        self.distance += segment.distance;
        self.duration += segment.duration;
    }

    /// Distance in kilometres, for display only
    pub fn distance_km(&self) -> f64 {
        self.distance / 1000.0
    }

    /// Whole hours and remaining minutes, for display only
    pub fn duration_hm(&self) -> (u64, u64) {
        let secs = self.duration.max(0.0) as u64;
        (secs / 3600, (secs % 3600) / 60)
    }
}

impl fmt::Display for RouteTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hours, minutes) = self.duration_hm();
        write!(f, "{:.1} km, {}h {}m", self.distance_km(), hours, minutes)
    }
}

/// Final schedule plus the route connecting it
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Post office the run starts and ends at
    pub depot: Option<Coordinate>,

    /// How the depot address was resolved; `None` for a fixed depot
    pub depot_geocode: Option<Geocode>,

    pub stops: Vec<ResolvedStop>,
    pub segments: Vec<RouteSegment>,
    pub totals: RouteTotals,

    /// Records excluded from the schedule, with their reasons
    pub rejected: Vec<RejectedRecord>,

    /// Segments missing from the totals
    pub missing_segments: Vec<SegmentFailure>,
}

impl RunSummary {
    /// Summary for a day without deliveries
    pub fn empty() -> Self {
        Self {
            depot: None,
            depot_geocode: None,
            stops: Vec::new(),
            segments: Vec::new(),
            totals: RouteTotals::default(),
            rejected: Vec::new(),
            missing_segments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// N stops bounded by the depot need N + 1 segments
    pub fn expected_segment_count(&self) -> usize {
        if self.stops.is_empty() {
            0
        } else {
            self.stops.len() + 1
        }
    }

    /// True when at least one segment is missing from the totals
    pub fn is_partial(&self) -> bool {
        !self.missing_segments.is_empty()
    }

    pub fn low_confidence_stops(&self) -> impl Iterator<Item = (usize, &ResolvedStop)> {
        self.stops
            .iter()
            .enumerate()
            .filter(|(_, stop)| stop.is_low_confidence())
    }

    /// True when the post office itself only has an approximate location
    pub fn is_depot_approximate(&self) -> bool {
        self.depot_geocode
            .as_ref()
            .is_some_and(Geocode::is_low_confidence)
    }

    /// True when the caller has anything to warn the courier about
    pub fn has_warnings(&self) -> bool {
        self.is_partial()
            || self.is_depot_approximate()
            || !self.rejected.is_empty()
            || self.low_confidence_stops().count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, GeocodeStrategy};

    fn segment(index: usize, distance: Meters, duration: Seconds) -> RouteSegment {
        RouteSegment {
            index,
            from: Coordinate::new(0.0, 0.0),
            to: Coordinate::new(1.0, 1.0),
            path: Vec::new(),
            distance,
            duration,
        }
    }

    #[test]
    fn test_totals_accumulate() {
        let mut totals = RouteTotals::default();
        totals.add(&segment(0, 1200.0, 300.0));
        totals.add(&segment(1, 800.0, 4200.0));

        assert_eq!(totals.distance, 2000.0);
        assert_eq!(totals.duration, 4500.0);
        assert_eq!(totals.distance_km(), 2.0);
        assert_eq!(totals.duration_hm(), (1, 15));
        assert_eq!(totals.to_string(), "2.0 km, 1h 15m");
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::empty();

        assert!(summary.is_empty());
        assert!(!summary.is_partial());
        assert!(!summary.has_warnings());
        assert_eq!(summary.expected_segment_count(), 0);
    }

    #[test]
    fn test_approximate_depot_is_a_warning() {
        let mut summary = RunSummary::empty();
        summary.depot_geocode = Some(Geocode {
            coordinate: Coordinate::new(77.209, 28.6139),
            matched_label: None,
            strategy: GeocodeStrategy::Fallback,
            confidence: Confidence::LowConfidence,
        });

        assert!(summary.is_depot_approximate());
        assert!(summary.has_warnings());

        summary.depot_geocode = Some(Geocode {
            confidence: Confidence::Resolved,
            strategy: GeocodeStrategy::FullAddress,
            ..summary.depot_geocode.clone().unwrap()
        });
        assert!(!summary.is_depot_approximate());
        assert!(!summary.has_warnings());
    }
}
