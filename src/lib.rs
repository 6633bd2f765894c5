//! Per-SKU demand planning engine.
//!
//! Turns raw demand history into a forecast, a replenishment policy, and
//! simulated reorder/stockout dates, with backtested accuracy and
//! rule-based insights attached. The pipeline for one SKU:
//!
//! 1. Regularize raw observations onto a fixed calendar step.
//! 2. Select a forecast backend and interval strategy (intermittent
//!    routing, long-seasonal fallback, conformal gating).
//! 3. Forecast over the horizon.
//! 4. Derive demand statistics, safety stock, and the reorder point.
//! 5. Resolve or estimate starting inventory.
//! 6. Simulate depletion to find reorder and stockout dates.
//! 7. Backtest accuracy on an 80/20 holdout split.
//! 8. Emit human-readable insights.
//!
//! Batches of SKUs run in parallel with per-SKU failure isolation.
//!
//! ```
//! use chrono::NaiveDate;
//! use demand_planner::core::{DemandObservation, PlanningConfig};
//! use demand_planner::engine::PlanningEngine;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let observations: Vec<DemandObservation> = (0..30)
//!     .map(|i| {
//!         DemandObservation::new("SKU-1", start + chrono::Duration::days(i), 10.0)
//!     })
//!     .collect();
//!
//! let engine = PlanningEngine::new();
//! let config = PlanningConfig { horizon: 7, ..PlanningConfig::default() };
//! let batch = engine.plan_batch(&observations, None, &config, &[]).unwrap();
//! assert_eq!(batch.outcomes.len(), 1);
//! ```

pub mod backends;
pub mod backtest;
pub mod core;
pub mod engine;
pub mod error;
pub mod insights;
pub mod inventory;
pub mod policy;
pub mod regularize;
pub mod select;

pub use error::{PlanningError, Result};

/// Common imports for downstream users.
pub mod prelude {
    pub use crate::backends::{BackendRegistry, DemandForecaster};
    pub use crate::core::{
        DemandObservation, ExogenousFrame, ForecastPoint, Frequency, ModelKind, PlanningConfig,
        RegularSeries, SkuContext,
    };
    pub use crate::engine::{BatchOutcome, PlanningEngine, PlanningOutcome};
    pub use crate::error::{PlanningError, Result};
    pub use crate::insights::{Insight, Severity};
    pub use crate::regularize::regularize;
}
