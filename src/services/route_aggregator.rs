use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::models::{Coordinate, RouteSegment, RouteTotals, SegmentFailure};
use crate::services::provider::{PathProvider, PathResponse};
use crate::utils::polyline::{self, DEFAULT_PRECISION};

/// Segments of a run and their totals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteReport {
    /// Successful segments, in run order
    pub segments: Vec<RouteSegment>,

    /// Segments left out of the totals
    pub failures: Vec<SegmentFailure>,

    pub totals: RouteTotals,
}

impl RouteReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Routes depot → stops → depot one consecutive pair at a time
pub struct RouteAggregator {
    provider: Arc<dyn PathProvider>,
    timeout: Duration,
    concurrency: usize,
}

impl RouteAggregator {
    pub fn new(provider: Arc<dyn PathProvider>, timeout: Duration, concurrency: usize) -> Self {
        Self {
            provider,
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    /// Requests all N + 1 segments concurrently and sums the ones that arrive.
    /// Totals stay in meters and seconds.
    pub async fn aggregate(&self, depot: Coordinate, stops: &[Coordinate]) -> RouteReport {
        if stops.is_empty() {
            return RouteReport::default();
        }

        let waypoints = waypoints(depot, stops);
        let legs: Vec<(usize, Coordinate, Coordinate)> = waypoints
            .windows(2)
            .enumerate()
            .map(|(index, pair)| (index, pair[0], pair[1]))
            .collect();

        // `buffered` yields in input order whatever the completion order
        let outcomes: Vec<_> = stream::iter(legs)
            .map(|(index, from, to)| async move {
                (index, from, to, self.segment(index, from, to).await)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = RouteReport::default();
        for (index, from, to, outcome) in outcomes {
            match outcome {
                Ok(segment) => {
                    report.totals.add(&segment);
                    report.segments.push(segment);
                }
                Err(reason) => {
                    warn!(segment = index, %reason, "route segment missing from totals");
                    report.failures.push(SegmentFailure {
                        index,
                        from,
                        to,
                        reason,
                    });
                }
            }
        }

        debug!(
            segments = report.segments.len(),
            failures = report.failures.len(),
            distance_m = report.totals.distance,
            duration_s = report.totals.duration,
            "route aggregated"
        );
        report
    }

    async fn segment(
        &self,
        index: usize,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<RouteSegment, ProviderError> {
        let response = match tokio::time::timeout(self.timeout, self.provider.route(from, to)).await
        {
            Ok(result) => result?.ok_or(ProviderError::NoResult)?,
            Err(_) => return Err(ProviderError::Timeout(self.timeout)),
        };
        into_segment(index, from, to, response)
    }
}

/// Depot, then every stop, then the depot again
pub fn waypoints(depot: Coordinate, stops: &[Coordinate]) -> Vec<Coordinate> {
    let mut points = Vec::with_capacity(stops.len() + 2);
    points.push(depot);
    points.extend_from_slice(stops);
    points.push(depot);
    points
}

fn into_segment(
    index: usize,
    from: Coordinate,
    to: Coordinate,
    response: PathResponse,
) -> Result<RouteSegment, ProviderError> {
    let valid = |v: f64| v.is_finite() && v >= 0.0;
    if !valid(response.distance) || !valid(response.duration) {
        return Err(ProviderError::InvalidResponse(format!(
            "distance {} / duration {}",
            response.distance, response.duration
        )));
    }

    let path = polyline::decode(&response.polyline, DEFAULT_PRECISION)
        .ok_or_else(|| ProviderError::InvalidResponse("undecodable polyline".to_string()))?;

    Ok(RouteSegment {
        index,
        from,
        to,
        path,
        distance: response.distance,
        duration: response.duration,
    })
}
