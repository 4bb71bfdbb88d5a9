pub mod base;
pub mod response;
pub mod transforms;

pub use base::{DayPlan, DaySummary, Itinerary, Stop, StopCategory};
