// Models module - exports all model types

mod coordinate;
mod delivery;
mod route;
mod stop;
mod time_window;

// Re-export model types
pub use self::coordinate::Coordinate;
pub use self::delivery::{DeliveryRecord, DeliveryStatus};
pub use self::route::{RouteSegment, RouteTotals, RunSummary, SegmentFailure};
pub use self::stop::{
    Confidence, Geocode, GeocodeStrategy, RejectedRecord, ResolvedStop, ScheduledStop,
};
pub use self::time_window::TimeWindow;

// Common type aliases for improved code readability
pub type RecordId = String;
pub type Meters = f64;
pub type Seconds = f64;
