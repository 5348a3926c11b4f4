pub mod deconflict;
pub mod schedule_resolver;

pub use deconflict::Deconflictor;
pub use schedule_resolver::{Resolution, ScheduleResolver};
