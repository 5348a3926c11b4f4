// Public modules
pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

// Re-exports for convenience
pub use algorithms::{Deconflictor, ScheduleResolver};
pub use config::PlannerConfig;
pub use models::{DeliveryRecord, ResolvedStop, RouteSegment, RunSummary, TimeWindow};
pub use services::{Depot, RunPlanner};
