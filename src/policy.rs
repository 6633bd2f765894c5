//! Safety-stock and reorder-point policy.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::core::RegularSeries;
use crate::error::{PlanningError, Result};

/// Demand moments and lead-time geometry used by the policy math.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandStatistics {
    pub mean_per_period: f64,
    pub std_per_period: f64,
    /// Lead time expressed in whole series periods, at least one.
    pub periods_in_lead_time: usize,
    /// Normal quantile for the target service level.
    pub z_value: f64,
}

impl DemandStatistics {
    /// Expected demand over the full lead time.
    pub fn lead_time_demand(&self) -> f64 {
        self.mean_per_period * self.periods_in_lead_time as f64
    }
}

/// Replenishment thresholds derived from the demand statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Policy {
    pub safety_stock: f64,
    pub reorder_point: f64,
}

/// Normal quantile for a one-sided service level, clamped to [0.5, 0.999].
pub fn service_level_z(service_level: f64) -> f64 {
    let normal = Normal::new(0.0, 1.0).unwrap();
    normal.inverse_cdf(service_level.clamp(0.5, 0.999))
}

/// Compute demand statistics over the historical series.
pub fn demand_statistics(
    series: &RegularSeries,
    lead_time_days: u32,
    service_level: f64,
) -> Result<DemandStatistics> {
    let demand = series.demand();
    if demand.is_empty() {
        return Err(PlanningError::EmptyData);
    }

    let step = series.frequency().step_days();
    let periods_in_lead_time = (lead_time_days.div_ceil(step) as usize).max(1);

    let mean = demand.iter().sum::<f64>() / demand.len() as f64;
    let variance =
        demand.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / demand.len() as f64;

    Ok(DemandStatistics {
        mean_per_period: mean,
        std_per_period: variance.sqrt(),
        periods_in_lead_time,
        z_value: service_level_z(service_level),
    })
}

/// Safety stock and reorder point from the statistics.
///
/// Safety stock absorbs demand variability over the lead time at the target
/// service level; the reorder point adds expected lead-time demand on top.
/// Both are floored at zero.
pub fn replenishment_policy(stats: &DemandStatistics) -> Policy {
    let safety_stock = (stats.z_value
        * stats.std_per_period
        * (stats.periods_in_lead_time as f64).sqrt())
    .max(0.0);
    let reorder_point = (stats.lead_time_demand() + safety_stock).max(0.0);
    Policy {
        safety_stock,
        reorder_point,
    }
}
