use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::GeocoderConfig;
use crate::error::ProviderError;
use crate::models::{Confidence, Geocode, GeocodeStrategy};
use crate::services::cache::GeocodeCache;
use crate::services::provider::{AddressProvider, GeocodeFilters, PlaceType, ProviderHit};
use crate::utils::hash::address_offset;

/// One rung of the geocoding ladder
#[derive(Debug, Clone, PartialEq)]
pub struct LadderStep {
    pub strategy: GeocodeStrategy,
    pub query: String,
    pub filters: GeocodeFilters,
}

/// Total address resolver.
///
/// Tries the full address, then its first comma-delimited segment with the
/// city qualifier, then that segment alone on looser place types, then the
/// city-center query. Whatever matches is moved by an offset derived from the
/// original address, so the same text always lands on the same point. When
/// nothing matches the fixed city center is used, with the same offset, and
/// the result is marked low-confidence.
pub struct Geocoder {
    provider: Arc<dyn AddressProvider>,
    cache: Option<Arc<dyn GeocodeCache>>,
    config: GeocoderConfig,
    timeout: Duration,
}

impl Geocoder {
    pub fn new(provider: Arc<dyn AddressProvider>, config: GeocoderConfig, timeout: Duration) -> Self {
        Self {
            provider,
            cache: None,
            config,
            timeout,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn GeocodeCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolves `address`; never fails
    pub async fn geocode(&self, address: &str) -> Geocode {
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(address)) {
            debug!(address, "geocode cache hit");
            return cached;
        }

        let (d_lon, d_lat) = address_offset(
            address,
            self.config.lon_offset_range,
            self.config.lat_offset_range,
        );

        for step in self.ladder(address) {
            match self.query(&step.query, &step.filters).await {
                Ok(Some(hit)) => {
                    debug!(
                        address,
                        strategy = %step.strategy,
                        label = %hit.label,
                        "address resolved"
                    );
                    let geocode = Geocode {
                        coordinate: hit.coordinate.offset(d_lon, d_lat),
                        matched_label: Some(hit.label),
                        strategy: step.strategy,
                        confidence: Confidence::Resolved,
                    };
                    if let Some(cache) = &self.cache {
                        cache.put(address, geocode.clone());
                    }
                    return geocode;
                }
                Ok(None) => debug!(address, strategy = %step.strategy, "no match"),
                Err(error) => debug!(address, strategy = %step.strategy, %error, "query failed"),
            }
        }

        warn!(address, "using approximate location for address");
        Geocode {
            coordinate: self.config.city_center.offset(d_lon, d_lat),
            matched_label: None,
            strategy: GeocodeStrategy::Fallback,
            confidence: Confidence::LowConfidence,
        }
    }

    /// Queries tried for `address`, in order. Rungs with an empty query are left out.
    pub fn ladder(&self, address: &str) -> Vec<LadderStep> {
        let full = normalize(address);
        let primary = normalize(address.split(',').next().unwrap_or_default());

        let strict = self.filters(vec![PlaceType::Address, PlaceType::Poi, PlaceType::Place]);
        let relaxed = self.filters(vec![PlaceType::Place, PlaceType::Neighborhood]);
        let place_only = self.filters(vec![PlaceType::Place]);

        let mut steps = Vec::with_capacity(4);
        if !full.is_empty() {
            steps.push(LadderStep {
                strategy: GeocodeStrategy::FullAddress,
                query: full,
                filters: strict.clone(),
            });
        }
        if !primary.is_empty() {
            steps.push(LadderStep {
                strategy: GeocodeStrategy::PrimarySegmentWithCity,
                query: format!("{}, {}", primary, self.config.city_qualifier),
                filters: strict,
            });
            steps.push(LadderStep {
                strategy: GeocodeStrategy::PrimarySegment,
                query: primary,
                filters: relaxed,
            });
        }
        steps.push(LadderStep {
            strategy: GeocodeStrategy::CityCenterQuery,
            query: self.config.city_center_query.clone(),
            filters: place_only,
        });
        steps
    }

    fn filters(&self, types: Vec<PlaceType>) -> GeocodeFilters {
        GeocodeFilters {
            types,
            bbox: Some(self.config.bbox),
            proximity: Some(self.config.proximity),
            country: Some(self.config.country.clone()).filter(|c| !c.is_empty()),
            limit: 1,
        }
    }

    async fn query(
        &self,
        query: &str,
        filters: &GeocodeFilters,
    ) -> Result<Option<ProviderHit>, ProviderError> {
        match tokio::time::timeout(self.timeout, self.provider.resolve(query, filters)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        }
    }
}

/// Trims and collapses whitespace runs
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
