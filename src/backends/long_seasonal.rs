//! Long-seasonal backend for series with multiple seasonal cycles.

use crate::backends::{interval_z, mean, population_std, DemandForecaster};
use crate::core::{ExogenousFrame, ForecastBands, RegularSeries};
use crate::error::{PlanningError, Result};

/// Additive multi-period seasonal decomposition around a base level.
///
/// Each configured period contributes its own phase-indexed adjustment; a
/// period is skipped when fewer than two full cycles of history support it.
#[derive(Debug, Clone)]
pub struct LongSeasonal {
    periods: Vec<usize>,
    base: Option<f64>,
    components: Vec<(usize, Vec<f64>)>,
    n: usize,
    sigma: f64,
}

impl LongSeasonal {
    pub fn new(periods: Vec<usize>) -> Self {
        Self {
            periods,
            base: None,
            components: Vec::new(),
            n: 0,
            sigma: 0.0,
        }
    }

    fn seasonal_at(&self, t: usize) -> f64 {
        self.components
            .iter()
            .map(|(m, indices)| indices[t % m])
            .sum()
    }
}

impl DemandForecaster for LongSeasonal {
    fn fit(&mut self, series: &RegularSeries, _exogenous: Option<&ExogenousFrame>) -> Result<()> {
        let demand = series.demand();
        if demand.is_empty() {
            return Err(PlanningError::EmptyData);
        }
        let n = demand.len();
        let base = mean(demand);

        // Fit components sequentially against the running residual so
        // overlapping periods do not double-count the same variation.
        let mut residual: Vec<f64> = demand.iter().map(|&y| y - base).collect();
        let mut components = Vec::new();
        for &m in &self.periods {
            if m < 2 || n < 2 * m {
                continue;
            }
            let mut indices = vec![0.0; m];
            let mut counts = vec![0usize; m];
            for (i, &r) in residual.iter().enumerate() {
                indices[i % m] += r;
                counts[i % m] += 1;
            }
            for (idx, count) in indices.iter_mut().zip(&counts) {
                *idx /= (*count).max(1) as f64;
            }
            for (i, r) in residual.iter_mut().enumerate() {
                *r -= indices[i % m];
            }
            components.push((m, indices));
        }

        self.sigma = population_std(&residual);
        self.base = Some(base);
        self.components = components;
        self.n = n;
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let base = self.base.ok_or(PlanningError::FitRequired)?;
        Ok((0..horizon)
            .map(|i| (base + self.seasonal_at(self.n + i)).max(0.0))
            .collect())
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<ForecastBands> {
        let point = self.predict(horizon)?;
        let margin = interval_z(level) * self.sigma;
        let lower = point.iter().map(|p| (p - margin).max(0.0)).collect();
        let upper = point.iter().map(|p| p + margin).collect();
        Ok(ForecastBands::with_intervals(point, lower, upper))
    }

    fn name(&self) -> &'static str {
        "LongSeasonal"
    }
}
