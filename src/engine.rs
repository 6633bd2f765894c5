//! Per-SKU planning pipeline and the parallel batch runner.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::backends::{conformal_bands, BackendRegistry};
use crate::backtest::{backtest_accuracy, AccuracyMetrics};
use crate::core::{
    DemandObservation, ExogenousFrame, ForecastPoint, Frequency, PlanningConfig, RegularSeries,
    SkuContext,
};
use crate::error::{PlanningError, Result};
use crate::insights::{derive_insights, Insight};
use crate::inventory::{resolve_starting_inventory, simulate_depletion};
use crate::policy::{demand_statistics, replenishment_policy};
use crate::regularize::{regularize, regularize_exogenous};
use crate::select::{select_model, IntervalStrategy};

/// Minimum observations before a SKU can be forecast at all.
pub const MIN_FORECAST_OBSERVATIONS: usize = 3;

/// Complete planning result for one SKU.
///
/// Serializes to one JSON record; dates render as ISO-8601 strings and all
/// derived quantities are rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningOutcome {
    pub sku: String,
    pub model_used: String,
    pub forecast_points: Vec<ForecastPoint>,
    pub safety_stock: f64,
    pub reorder_point: f64,
    pub starting_inventory: f64,
    pub inventory_estimated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reorder_date: Option<chrono::NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stockout_date: Option<chrono::NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_order_qty: Option<f64>,
    pub lead_time_days: u32,
    pub service_level: f64,
    pub frequency: Frequency,
    pub insights: Vec<Insight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_metrics: Option<AccuracyMetrics>,
}

/// A SKU the batch runner had to skip, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuFailure {
    pub sku: String,
    pub error: String,
}

/// Batch output: successful plans plus isolated per-SKU failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub outcomes: Vec<PlanningOutcome>,
    pub failures: Vec<SkuFailure>,
}

/// The demand planning engine.
///
/// Holds the backend registry discovered at construction; everything else
/// flows through as arguments, so one engine can serve many configs.
pub struct PlanningEngine {
    registry: BackendRegistry,
}

impl Default for PlanningEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanningEngine {
    pub fn new() -> Self {
        Self {
            registry: BackendRegistry::standard(),
        }
    }

    pub fn with_registry(registry: BackendRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Run the full pipeline for one SKU.
    ///
    /// Stages run in order: select, forecast, statistics, policy, starting
    /// inventory, simulation, backtest, insights. The function is pure with
    /// respect to its inputs; identical arguments yield identical outcomes.
    pub fn plan_sku(
        &self,
        series: &RegularSeries,
        exogenous: Option<&ExogenousFrame>,
        config: &PlanningConfig,
        context: &SkuContext,
    ) -> Result<PlanningOutcome> {
        config.validate()?;
        if series.len() < MIN_FORECAST_OBSERVATIONS {
            return Err(PlanningError::InsufficientHistory {
                needed: MIN_FORECAST_OBSERVATIONS,
                got: series.len(),
            });
        }

        let selected = select_model(series, config, &self.registry)?;
        let frame = if selected.uses_exogenous { exogenous } else { None };

        let mut model = selected.create();
        model.fit(series, frame)?;

        let bands = match selected.intervals {
            IntervalStrategy::Parametric => {
                model.predict_with_intervals(config.horizon, config.confidence_level)?
            }
            IntervalStrategy::Conformal { windows } => {
                let point = model.predict(config.horizon)?;
                conformal_bands(
                    selected.spec,
                    &selected.params,
                    series,
                    point,
                    config.horizon,
                    config.confidence_level,
                    windows,
                )?
            }
            IntervalStrategy::None => crate::core::ForecastBands::from_points(
                model.predict(config.horizon)?,
            ),
        };

        let last = series.last_date();
        let dates: Vec<chrono::NaiveDate> = (1..=config.horizon)
            .map(|i| config.frequency.advance(last, i))
            .collect();
        let mut points = bands.into_points(&dates);
        for point in &mut points {
            point.forecast = round2(point.forecast);
            point.lower_bound = point.lower_bound.map(round2);
            point.upper_bound = point.upper_bound.map(round2);
        }

        let stats = demand_statistics(series, context.lead_time_days, config.service_level)?;
        let policy = replenishment_policy(&stats);
        let (starting_inventory, inventory_estimated) =
            resolve_starting_inventory(series, &stats, &policy, context);
        let simulation = simulate_depletion(
            &points,
            starting_inventory,
            policy.reorder_point,
            stats.lead_time_demand(),
        );
        let accuracy_metrics = backtest_accuracy(series, exogenous, config, &self.registry);
        let insights = derive_insights(series, &points, inventory_estimated, &simulation);

        info!(
            sku = %context.sku,
            model = selected.identifier,
            reorder = ?simulation.reorder_date,
            stockout = ?simulation.stockout_date,
            "planned SKU"
        );

        Ok(PlanningOutcome {
            sku: context.sku.clone(),
            model_used: selected.identifier.to_string(),
            forecast_points: points,
            safety_stock: round2(policy.safety_stock),
            reorder_point: round2(policy.reorder_point),
            starting_inventory: round2(starting_inventory),
            inventory_estimated,
            reorder_date: simulation.reorder_date,
            stockout_date: simulation.stockout_date,
            recommended_order_qty: simulation.recommended_order_qty.map(round2),
            lead_time_days: context.lead_time_days,
            service_level: config.service_level,
            frequency: config.frequency,
            insights,
            accuracy_metrics,
        })
    }

    /// Plan every SKU found in a batch of raw observations.
    ///
    /// SKUs run in parallel and fail independently; one SKU's error becomes
    /// a `SkuFailure` entry instead of aborting the batch. An empty batch is
    /// a contract violation and is rejected up front.
    pub fn plan_batch(
        &self,
        observations: &[DemandObservation],
        exogenous_raw: Option<&[(String, Vec<(chrono::NaiveDate, f64)>)]>,
        config: &PlanningConfig,
        contexts: &[SkuContext],
    ) -> Result<BatchOutcome> {
        if observations.is_empty() {
            return Err(PlanningError::MissingRequiredMapping(
                "batch contains no demand observations".to_string(),
            ));
        }
        config.validate()?;

        let mut by_sku: BTreeMap<&str, Vec<DemandObservation>> = BTreeMap::new();
        for obs in observations {
            by_sku.entry(obs.sku.as_str()).or_default().push(obs.clone());
        }
        let context_by_sku: BTreeMap<&str, &SkuContext> =
            contexts.iter().map(|c| (c.sku.as_str(), c)).collect();

        let groups: Vec<(&str, Vec<DemandObservation>)> = by_sku.into_iter().collect();
        let results: Vec<std::result::Result<PlanningOutcome, SkuFailure>> = groups
            .par_iter()
            .map(|(sku, group)| {
                self.plan_one(sku, group, exogenous_raw, config, context_by_sku.get(sku).copied())
                    .map_err(|error| {
                        warn!(sku = %sku, %error, "skipping SKU");
                        SkuFailure {
                            sku: sku.to_string(),
                            error: error.to_string(),
                        }
                    })
            })
            .collect();

        let mut outcomes = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(failure) => failures.push(failure),
            }
        }
        info!(
            planned = outcomes.len(),
            skipped = failures.len(),
            "batch complete"
        );
        Ok(BatchOutcome { outcomes, failures })
    }

    fn plan_one(
        &self,
        sku: &str,
        observations: &[DemandObservation],
        exogenous_raw: Option<&[(String, Vec<(chrono::NaiveDate, f64)>)]>,
        config: &PlanningConfig,
        context: Option<&SkuContext>,
    ) -> Result<PlanningOutcome> {
        let series = regularize(observations, config.frequency)?;
        let frame = match exogenous_raw {
            Some(raw) if config.use_exogenous => Some(regularize_exogenous(&series, raw)?),
            _ => None,
        };
        let fallback;
        let context = match context {
            Some(context) => context,
            None => {
                fallback = SkuContext::with_defaults(sku, config);
                &fallback
            }
        };
        self.plan_sku(&series, frame.as_ref(), config, context)
    }
}

/// Round to two decimal places for presentation.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
