//! Starting-inventory resolution and depletion simulation.

use chrono::NaiveDate;
use tracing::debug;

use crate::core::{ForecastPoint, RegularSeries, SkuContext};
use crate::policy::{DemandStatistics, Policy};

/// Resolve the inventory level the simulation starts from.
///
/// A supplied on-hand quantity is used as-is. Otherwise the level is
/// estimated from recent demand: enough to cover the lead time plus a
/// margin above the reorder point, so the simulation starts from a
/// plausible mid-cycle position instead of zero. The boolean flags the
/// estimate so downstream output can label it an assumption.
pub fn resolve_starting_inventory(
    series: &RegularSeries,
    stats: &DemandStatistics,
    policy: &Policy,
    context: &SkuContext,
) -> (f64, bool) {
    if let Some(on_hand) = context.on_hand {
        return (on_hand.max(0.0), false);
    }

    let demand = series.demand();
    let window = stats.periods_in_lead_time.max(7).min(demand.len());
    let recent = &demand[demand.len() - window..];
    let mut recent_mean = recent.iter().sum::<f64>() / recent.len() as f64;
    if !recent_mean.is_finite() || recent_mean <= 0.0 {
        recent_mean = stats.mean_per_period;
    }

    let step = series.frequency().step_days() as f64;
    let coverage_periods = ((context.lead_time_days as f64 + step).max(7.0) / step).ceil();
    let mut estimate = recent_mean * coverage_periods;

    let floor = policy.reorder_point
        + recent_mean * (stats.periods_in_lead_time as f64 / 2.0).ceil();
    if estimate < floor {
        estimate = floor;
    }
    let estimate = estimate.max(0.0);

    debug!(
        sku = %context.sku,
        estimate, recent_mean, coverage_periods, "estimated starting inventory"
    );
    (estimate, true)
}

/// Dates and order quantity derived from walking the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulationResult {
    pub reorder_date: Option<NaiveDate>,
    pub stockout_date: Option<NaiveDate>,
    pub recommended_order_qty: Option<f64>,
}

/// Deplete a starting inventory level along the point forecast.
///
/// The level drops by each period's point forecast; bounds are ignored. The
/// first period at or below the reorder point fixes the reorder date and
/// order quantity; the first period at or below zero fixes the stockout
/// date and ends the walk, even when both trigger in the same period.
pub fn simulate_depletion(
    points: &[ForecastPoint],
    starting_inventory: f64,
    reorder_point: f64,
    lead_time_demand: f64,
) -> SimulationResult {
    let mut result = SimulationResult::default();
    let mut level = starting_inventory;

    for point in points {
        level -= point.forecast;

        if result.reorder_date.is_none() && level <= reorder_point {
            result.reorder_date = Some(point.date);
            let qty = (lead_time_demand + reorder_point - level).max(0.0);
            result.recommended_order_qty = Some(qty);
        }

        if level <= 0.0 {
            result.stockout_date = Some(point.date);
            break;
        }
    }

    result
}
