//! Core data structures for demand planning.

mod config;
mod forecast;
mod series;

pub use config::{Frequency, ModelKind, PlanningConfig, SkuContext};
pub use forecast::{ForecastBands, ForecastPoint};
pub use series::{DemandObservation, ExogenousFrame, RegularSeries};
