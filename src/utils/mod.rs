pub mod hash;
pub mod plot;
pub mod polyline;
pub mod records;
pub mod sample;
