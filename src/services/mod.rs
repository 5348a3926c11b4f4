pub mod cache;
pub mod geocoder;
pub mod mapbox;
pub mod planner;
pub mod provider;
pub mod route_aggregator;

pub use cache::{GeocodeCache, InMemoryGeocodeCache};
pub use geocoder::Geocoder;
pub use mapbox::{MapboxDirections, MapboxGeocoder};
pub use planner::{Depot, RunPlanner};
pub use provider::{AddressProvider, GeocodeFilters, PathProvider, PathResponse, PlaceType, ProviderHit};
pub use route_aggregator::{RouteAggregator, RouteReport};
