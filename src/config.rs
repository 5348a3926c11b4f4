// Planner configuration: defaults, optional JSON file, environment overrides

use crate::error::ConfigError;
use crate::models::Coordinate;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const ACCESS_TOKEN_VAR: &str = "MAPBOX_ACCESS_TOKEN";
pub const TIMEOUT_VAR: &str = "DELIVERY_RUN_TIMEOUT_SECS";
pub const CONCURRENCY_VAR: &str = "DELIVERY_RUN_MAX_CONCURRENCY";

/// Geographic bounding box as (min lon, min lat, max lon, max lat)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn contains(&self, c: &Coordinate) -> bool {
        (self.min_lon..=self.max_lon).contains(&c.lon)
            && (self.min_lat..=self.max_lat).contains(&c.lat)
    }

    /// Comma separated form used in provider queries
    pub fn to_query(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub country: String,
    pub bbox: BoundingBox,
    pub proximity: Coordinate,

    /// Appended to the first address segment on the second rung
    pub city_qualifier: String,

    /// Query of the last rung, always expected to hit
    pub city_center_query: String,

    /// Used when every rung fails
    pub city_center: Coordinate,

    /// Half-widths of the deterministic offset, in degrees
    pub lat_offset_range: f64,
    pub lon_offset_range: f64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mapbox.com/geocoding/v5/mapbox.places".to_string(),
            access_token: String::new(),
            country: "IN".to_string(),
            bbox: BoundingBox {
                min_lon: 77.1,
                min_lat: 28.4,
                max_lon: 77.3,
                max_lat: 28.7,
            },
            proximity: Coordinate::new(77.2, 28.5),
            city_qualifier: "New Delhi".to_string(),
            city_center_query: "Central Delhi".to_string(),
            city_center: Coordinate::new(77.2090, 28.6139),
            lat_offset_range: 0.01,
            lon_offset_range: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub profile: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mapbox.com/directions/v5/mapbox".to_string(),
            access_token: String::new(),
            profile: "driving".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Latest time a shifted window may end, "HH:MM" in 24h form
    pub day_end: Option<String>,
}

impl ScheduleConfig {
    pub fn day_end_time(&self) -> Result<Option<NaiveTime>, ConfigError> {
        self.day_end
            .as_deref()
            .map(|text| {
                NaiveTime::parse_from_str(text.trim(), "%H:%M").map_err(|_| {
                    ConfigError::InvalidValue {
                        key: "schedule.day_end".to_string(),
                        value: text.to_string(),
                    }
                })
            })
            .transpose()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub geocoder: GeocoderConfig,
    pub routing: RoutingConfig,
    pub schedule: ScheduleConfig,

    /// Minimum spacing between stops, in degrees
    pub deconflict_threshold: f64,

    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            geocoder: GeocoderConfig::default(),
            routing: RoutingConfig::default(),
            schedule: ScheduleConfig::default(),
            deconflict_threshold: 0.0001,
            request_timeout_secs: 10,
            max_concurrent_requests: 8,
        }
    }
}

impl PlannerConfig {
    /// Defaults, overlaid by an optional JSON file, overlaid by the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = fs::read_to_string(path)?;
                serde_json::from_str(&text)?
            }
            None => PlannerConfig::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment variable overrides
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(token) = env::var(ACCESS_TOKEN_VAR) {
            self.set_access_token(token);
        }
        if let Ok(value) = env::var(TIMEOUT_VAR) {
            self.request_timeout_secs = parse_var(TIMEOUT_VAR, &value)?;
        }
        if let Ok(value) = env::var(CONCURRENCY_VAR) {
            self.max_concurrent_requests = parse_var(CONCURRENCY_VAR, &value)?;
        }
        Ok(())
    }

    pub fn set_access_token(&mut self, token: String) {
        self.geocoder.access_token = token.clone();
        self.routing.access_token = token;
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.deconflict_threshold > 0.0) {
            return Err(invalid("deconflict_threshold", self.deconflict_threshold));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", self.request_timeout_secs));
        }
        if self.max_concurrent_requests == 0 {
            return Err(invalid(
                "max_concurrent_requests",
                self.max_concurrent_requests,
            ));
        }
        if self.geocoder.lat_offset_range < 0.0 || self.geocoder.lon_offset_range < 0.0 {
            return Err(invalid("geocoder offset range", "negative"));
        }
        self.schedule.day_end_time()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn invalid<V: ToString>(key: &str, value: V) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
