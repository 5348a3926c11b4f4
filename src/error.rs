// Error types shared across the crate

use std::time::Duration;
use thiserror::Error;

/// Per-record scheduling failures. These exclude a record, never the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("malformed time window '{window}': {reason}")]
    MalformedWindow { window: String, reason: String },

    #[error("window '{window}' would run past the end of the day ({limit})")]
    PastDayEnd { window: String, limit: String },
}

/// Per-call failures of the address or path provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),

    #[error("provider returned no result")]
    NoResult,
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::InvalidResponse(e.to_string())
        } else {
            ProviderError::Unavailable(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read records: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("courier '{0}' not found")]
    UnknownCourier(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("scheduling request cancelled")]
    Cancelled,
}
