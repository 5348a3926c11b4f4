// Contracts of the external address-resolution and path providers

use async_trait::async_trait;
use std::fmt;

use crate::config::BoundingBox;
use crate::error::ProviderError;
use crate::models::{Coordinate, Meters, Seconds};

/// Feature types a geocoding query may be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceType {
    Address,
    Poi,
    Place,
    Neighborhood,
    Locality,
    Postcode,
}

impl PlaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceType::Address => "address",
            PlaceType::Poi => "poi",
            PlaceType::Place => "place",
            PlaceType::Neighborhood => "neighborhood",
            PlaceType::Locality => "locality",
            PlaceType::Postcode => "postcode",
        }
    }
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restrictions applied to one geocoding query
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeFilters {
    pub types: Vec<PlaceType>,
    pub bbox: Option<BoundingBox>,
    pub proximity: Option<Coordinate>,
    pub country: Option<String>,
    pub limit: usize,
}

impl GeocodeFilters {
    /// Comma separated type list as sent to the provider
    pub fn types_query(&self) -> String {
        self.types
            .iter()
            .map(PlaceType::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Best feature returned for a query
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderHit {
    pub coordinate: Coordinate,
    pub label: String,
}

/// Path between two coordinates as returned by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct PathResponse {
    pub distance: Meters,
    pub duration: Seconds,

    /// Encoded polyline geometry
    pub polyline: String,
}

#[async_trait]
pub trait AddressProvider: Send + Sync {
    /// Resolves a query; `Ok(None)` means the provider found nothing
    async fn resolve(
        &self,
        query: &str,
        filters: &GeocodeFilters,
    ) -> Result<Option<ProviderHit>, ProviderError>;
}

#[async_trait]
pub trait PathProvider: Send + Sync {
    /// Routes between two points; `Ok(None)` means no route exists
    async fn route(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Option<PathResponse>, ProviderError>;
}
