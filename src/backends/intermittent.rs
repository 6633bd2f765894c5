//! Croston-family backends for intermittent demand.
//!
//! Croston's method smooths non-zero demand sizes and inter-arrival
//! intervals separately, then forecasts their ratio as a flat rate. The SBA
//! variant applies the Syntetos-Boylan bias correction; the optimized
//! variant searches the smoothing parameter over a fixed grid.

use crate::backends::DemandForecaster;
use crate::core::{ExogenousFrame, RegularSeries};
use crate::error::{PlanningError, Result};

const DEFAULT_ALPHA: f64 = 0.1;
const ALPHA_GRID: [f64; 10] = [0.05, 0.1, 0.15, 0.2, 0.25, 0.3, 0.35, 0.4, 0.45, 0.5];

/// Croston variant selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrostonVariant {
    /// Classic Croston with a fixed smoothing parameter.
    Classic,
    /// Classic update rule with alpha chosen by grid search.
    Optimized,
    /// Syntetos-Boylan approximation (bias-corrected).
    Sba,
}

/// Croston's method for intermittent demand.
///
/// Produces point forecasts only; intervals come from the conformal wrapper
/// when history allows it.
#[derive(Debug, Clone)]
pub struct Croston {
    variant: CrostonVariant,
    alpha: f64,
    rate: Option<f64>,
}

impl Croston {
    pub fn new(variant: CrostonVariant) -> Self {
        Self {
            variant,
            alpha: DEFAULT_ALPHA,
            rate: None,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Split the series into non-zero demand sizes and the gaps between them.
    fn extract_demands(values: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut demands = Vec::new();
        let mut intervals = Vec::new();
        let mut last_index: Option<usize> = None;
        for (i, &v) in values.iter().enumerate() {
            if v > 0.0 {
                demands.push(v);
                if let Some(last) = last_index {
                    intervals.push((i - last) as f64);
                }
                last_index = Some(i);
            }
        }
        (demands, intervals)
    }

    /// Final SES level over a sequence.
    fn ses_level(values: &[f64], alpha: f64) -> f64 {
        let mut level = match values.first() {
            Some(&v) => v,
            None => return 1.0,
        };
        for &v in &values[1..] {
            level = alpha * v + (1.0 - alpha) * level;
        }
        level
    }

    /// One-step-ahead SES squared error, used by the grid search.
    fn ses_sse(values: &[f64], alpha: f64) -> f64 {
        if values.len() < 2 {
            return 0.0;
        }
        let mut level = values[0];
        let mut sse = 0.0;
        for &v in &values[1..] {
            let error = v - level;
            sse += error * error;
            level = alpha * v + (1.0 - alpha) * level;
        }
        sse
    }

    fn pick_alpha(demands: &[f64], intervals: &[f64]) -> f64 {
        ALPHA_GRID
            .iter()
            .copied()
            .min_by(|&a, &b| {
                let cost_a = Self::ses_sse(demands, a) + Self::ses_sse(intervals, a);
                let cost_b = Self::ses_sse(demands, b) + Self::ses_sse(intervals, b);
                cost_a.partial_cmp(&cost_b).unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(DEFAULT_ALPHA)
    }
}

impl DemandForecaster for Croston {
    fn fit(&mut self, series: &RegularSeries, _exogenous: Option<&ExogenousFrame>) -> Result<()> {
        let demand = series.demand();
        if demand.is_empty() {
            return Err(PlanningError::EmptyData);
        }

        let (demands, intervals) = Self::extract_demands(demand);
        if demands.is_empty() {
            // All-zero history forecasts zero demand.
            self.rate = Some(0.0);
            return Ok(());
        }

        if self.variant == CrostonVariant::Optimized {
            self.alpha = Self::pick_alpha(&demands, &intervals);
        }

        let demand_level = Self::ses_level(&demands, self.alpha);
        let interval_level = if intervals.is_empty() {
            1.0
        } else {
            Self::ses_level(&intervals, self.alpha).max(1.0)
        };

        let mut rate = demand_level / interval_level;
        if self.variant == CrostonVariant::Sba {
            rate *= 1.0 - self.alpha / 2.0;
        }
        self.rate = Some(rate.max(0.0));
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let rate = self.rate.ok_or(PlanningError::FitRequired)?;
        Ok(vec![rate; horizon])
    }

    fn name(&self) -> &'static str {
        match self.variant {
            CrostonVariant::Classic => "CrostonClassic",
            CrostonVariant::Optimized => "CrostonOptimized",
            CrostonVariant::Sba => "CrostonSBA",
        }
    }
}
