// Mapbox geocoding and directions over HTTP

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::{GeocoderConfig, RoutingConfig};
use crate::error::ProviderError;
use crate::models::Coordinate;
use crate::services::provider::{
    AddressProvider, GeocodeFilters, PathProvider, PathResponse, ProviderHit,
};

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    place_name: String,
    geometry: PointGeometry,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    /// [lon, lat]
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    geometry: String,
    distance: f64,
    duration: f64,
}

fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Unavailable(format!("failed to build http client: {}", e)))
}

/// Base URL with extra path segments appended, each percent-encoded
fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, ProviderError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ProviderError::Unavailable(format!("invalid base url '{}': {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| ProviderError::Unavailable(format!("base url '{}' cannot take a path", base_url)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Address-resolution provider backed by the Mapbox places endpoint
pub struct MapboxGeocoder {
    client: Client,
    base_url: String,
    access_token: String,
}

impl MapboxGeocoder {
    pub fn new(config: &GeocoderConfig, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: config.base_url.clone(),
            access_token: config.access_token.clone(),
        })
    }
}

#[async_trait]
impl AddressProvider for MapboxGeocoder {
    async fn resolve(
        &self,
        query: &str,
        filters: &GeocodeFilters,
    ) -> Result<Option<ProviderHit>, ProviderError> {
        let segment = format!("{}.json", query);
        let url = endpoint(&self.base_url, &[segment.as_str()])?;

        let mut params: Vec<(&str, String)> = vec![
            ("access_token", self.access_token.clone()),
            ("limit", filters.limit.max(1).to_string()),
        ];
        if !filters.types.is_empty() {
            params.push(("types", filters.types_query()));
        }
        if let Some(bbox) = &filters.bbox {
            params.push(("bbox", bbox.to_query()));
        }
        if let Some(p) = &filters.proximity {
            params.push(("proximity", format!("{},{}", p.lon, p.lat)));
        }
        if let Some(country) = &filters.country {
            params.push(("country", country.clone()));
        }

        debug!(query, types = %filters.types_query(), "geocoding request");
        let body: FeatureCollection = self
            .client
            .get(url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        first_hit(body)
    }
}

fn first_hit(body: FeatureCollection) -> Result<Option<ProviderHit>, ProviderError> {
    let Some(feature) = body.features.into_iter().next() else {
        return Ok(None);
    };

    match feature.geometry.coordinates.as_slice() {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Ok(Some(ProviderHit {
            coordinate: Coordinate::new(*lon, *lat),
            label: feature.place_name,
        })),
        other => Err(ProviderError::InvalidResponse(format!(
            "feature coordinates {:?}",
            other
        ))),
    }
}

/// Path provider backed by the Mapbox directions endpoint
pub struct MapboxDirections {
    client: Client,
    base_url: String,
    access_token: String,
    profile: String,
}

impl MapboxDirections {
    pub fn new(config: &RoutingConfig, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: config.base_url.clone(),
            access_token: config.access_token.clone(),
            profile: config.profile.clone(),
        })
    }
}

#[async_trait]
impl PathProvider for MapboxDirections {
    async fn route(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Option<PathResponse>, ProviderError> {
        let pair = format!("{},{};{},{}", from.lon, from.lat, to.lon, to.lat);
        let url = endpoint(&self.base_url, &[self.profile.as_str(), pair.as_str()])?;

        let params = [
            ("access_token", self.access_token.as_str()),
            ("overview", "full"),
            ("geometries", "polyline"),
            ("steps", "false"),
        ];

        debug!(%pair, profile = %self.profile, "directions request");
        let body: DirectionsResponse = self
            .client
            .get(url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        first_route(body)
    }
}

fn first_route(body: DirectionsResponse) -> Result<Option<PathResponse>, ProviderError> {
    match body.code.as_str() {
        "Ok" => Ok(body.routes.into_iter().next().map(|r| PathResponse {
            distance: r.distance,
            duration: r.duration,
            polyline: r.geometry,
        })),
        "NoRoute" | "NoSegment" => Ok(None),
        code => Err(ProviderError::InvalidResponse(format!(
            "{}: {}",
            code,
            body.message.unwrap_or_default()
        ))),
    }
}
