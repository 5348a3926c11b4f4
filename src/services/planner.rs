use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::algorithms::{Deconflictor, ScheduleResolver};
use crate::config::PlannerConfig;
use crate::error::{ConfigError, PlanError};
use crate::models::{Coordinate, DeliveryRecord, Geocode, ResolvedStop, RunSummary};
use crate::services::cache::GeocodeCache;
use crate::services::geocoder::Geocoder;
use crate::services::provider::{AddressProvider, PathProvider};
use crate::services::route_aggregator::RouteAggregator;

/// Where the run starts and ends
#[derive(Debug, Clone, PartialEq)]
pub enum Depot {
    /// Known post office position
    Fixed(Coordinate),

    /// Post office address, resolved through the geocoder
    Address(String),
}

/// Builds a day's run: resolve windows, geocode, spread, route.
pub struct RunPlanner {
    resolver: ScheduleResolver,
    geocoder: Geocoder,
    deconflictor: Deconflictor,
    router: RouteAggregator,
    depot: Depot,
    concurrency: usize,
}

impl RunPlanner {
    pub fn new(
        config: &PlannerConfig,
        address_provider: Arc<dyn AddressProvider>,
        path_provider: Arc<dyn PathProvider>,
        depot: Depot,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let timeout = config.request_timeout();

        Ok(Self {
            resolver: ScheduleResolver::with_day_end(config.schedule.day_end_time()?),
            geocoder: Geocoder::new(address_provider, config.geocoder.clone(), timeout),
            deconflictor: Deconflictor::new(config.deconflict_threshold),
            router: RouteAggregator::new(path_provider, timeout, config.max_concurrent_requests),
            depot,
            concurrency: config.max_concurrent_requests,
        })
    }

    pub fn with_cache(mut self, cache: Arc<dyn GeocodeCache>) -> Self {
        self.geocoder = self.geocoder.with_cache(cache);
        self
    }

    /// Produces the ordered, conflict-free schedule and its route.
    ///
    /// Never fails: rejected records, approximate locations and missing
    /// segments are reported on the summary.
    pub async fn build_schedule(&self, records: &[DeliveryRecord]) -> RunSummary {
        info!(records = records.len(), "building schedule");

        let resolution = self.resolver.resolve(records);
        if resolution.stops.is_empty() {
            info!(rejected = resolution.rejected.len(), "no deliveries to route");
            return RunSummary {
                rejected: resolution.rejected,
                ..RunSummary::empty()
            };
        }

        let geocoding = stream::iter(resolution.stops.iter())
            .map(|stop| self.geocoder.geocode(&stop.record.receiver_address))
            .buffered(self.concurrency)
            .collect::<Vec<Geocode>>();
        let ((depot, depot_geocode), geocodes) = futures::join!(self.locate_depot(), geocoding);

        let positions: Vec<Coordinate> = geocodes.iter().map(|g| g.coordinate).collect();
        let spread = self.deconflictor.spread(&positions);

        let stops: Vec<ResolvedStop> = resolution
            .stops
            .into_iter()
            .zip(geocodes)
            .zip(spread)
            .map(|((stop, geocode), coordinate)| ResolvedStop::new(stop, geocode, coordinate))
            .collect();

        let coordinates: Vec<Coordinate> = stops.iter().map(|s| s.coordinate).collect();
        let report = self.router.aggregate(depot, &coordinates).await;

        let summary = RunSummary {
            depot: Some(depot),
            depot_geocode,
            stops,
            segments: report.segments,
            totals: report.totals,
            rejected: resolution.rejected,
            missing_segments: report.failures,
        };

        info!(
            stops = summary.stops.len(),
            rejected = summary.rejected.len(),
            approximate = summary.low_confidence_stops().count(),
            depot_approximate = summary.is_depot_approximate(),
            missing_segments = summary.missing_segments.len(),
            totals = %summary.totals,
            "schedule built"
        );
        summary
    }

    /// As `build_schedule`, abandoning all outstanding calls once `token` fires
    pub async fn build_schedule_cancellable(
        &self,
        records: &[DeliveryRecord],
        token: &CancellationToken,
    ) -> Result<RunSummary, PlanError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                warn!("schedule request cancelled");
                Err(PlanError::Cancelled)
            }
            summary = self.build_schedule(records) => Ok(summary),
        }
    }

    /// Depot position, plus its geocode when it had to be resolved
    async fn locate_depot(&self) -> (Coordinate, Option<Geocode>) {
        match &self.depot {
            Depot::Fixed(coordinate) => (*coordinate, None),
            Depot::Address(address) => {
                let geocode = self.geocoder.geocode(address).await;
                if geocode.is_low_confidence() {
                    warn!(%address, "post office location is approximate");
                }
                (geocode.coordinate, Some(geocode))
            }
        }
    }
}
