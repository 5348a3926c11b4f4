// Stop models produced along the scheduling pipeline

use crate::error::ScheduleError;
use crate::models::{Coordinate, DeliveryRecord, TimeWindow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A record placed in the day's sequence with its resolved window
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledStop {
    pub record: DeliveryRecord,

    /// Window as declared by the customer
    pub original_window: TimeWindow,

    /// Window after overlap resolution
    pub window: TimeWindow,

    /// Position of the record in the input batch
    pub input_index: usize,
}

impl ScheduledStop {
    pub fn is_shifted(&self) -> bool {
        self.window != self.original_window
    }
}

/// A record the resolver could not place
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub record: DeliveryRecord,
    pub error: ScheduleError,
}

/// Which rung of the geocoding ladder produced a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeocodeStrategy {
    FullAddress,
    PrimarySegmentWithCity,
    PrimarySegment,
    CityCenterQuery,
    /// No provider answer at all, fixed city-center coordinate used
    Fallback,
}

impl fmt::Display for GeocodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeocodeStrategy::FullAddress => "full address",
            GeocodeStrategy::PrimarySegmentWithCity => "primary segment with city",
            GeocodeStrategy::PrimarySegment => "primary segment",
            GeocodeStrategy::CityCenterQuery => "city center query",
            GeocodeStrategy::Fallback => "fixed fallback",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Resolved,
    LowConfidence,
}

/// Outcome of geocoding one address. Always carries a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geocode {
    pub coordinate: Coordinate,

    /// Label of the provider feature that matched, if any
    pub matched_label: Option<String>,

    pub strategy: GeocodeStrategy,

    pub confidence: Confidence,
}

impl Geocode {
    pub fn is_low_confidence(&self) -> bool {
        self.confidence == Confidence::LowConfidence
    }
}

/// A scheduled stop with its position on the map
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStop {
    pub record: DeliveryRecord,
    pub original_window: TimeWindow,
    pub window: TimeWindow,

    /// Position used for routing, after deconfliction
    pub coordinate: Coordinate,

    pub geocode: Geocode,
}

impl ResolvedStop {
    pub fn new(stop: ScheduledStop, geocode: Geocode, coordinate: Coordinate) -> Self {
        Self {
            record: stop.record,
            original_window: stop.original_window,
            window: stop.window,
            coordinate,
            geocode,
        }
    }

    pub fn is_shifted(&self) -> bool {
        self.window != self.original_window
    }

    pub fn is_low_confidence(&self) -> bool {
        self.geocode.is_low_confidence()
    }
}
