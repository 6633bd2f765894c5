//! Baseline backends: naive and seasonal-naive.

use crate::backends::{interval_z, population_std, DemandForecaster};
use crate::core::{ExogenousFrame, ForecastBands, RegularSeries};
use crate::error::{PlanningError, Result};

/// Repeats the last observed value for every future period.
#[derive(Debug, Clone, Default)]
pub struct Naive {
    last: Option<f64>,
    sigma: f64,
}

impl Naive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DemandForecaster for Naive {
    fn fit(&mut self, series: &RegularSeries, _exogenous: Option<&ExogenousFrame>) -> Result<()> {
        let demand = series.demand();
        self.last = demand.last().copied();
        self.sigma = population_std(demand);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let last = self.last.ok_or(PlanningError::FitRequired)?;
        Ok(vec![last; horizon])
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<ForecastBands> {
        let point = self.predict(horizon)?;
        let margin = interval_z(level) * self.sigma;
        let lower = point.iter().map(|p| p - margin).collect();
        let upper = point.iter().map(|p| p + margin).collect();
        Ok(ForecastBands::with_intervals(point, lower, upper))
    }

    fn name(&self) -> &'static str {
        "Naive"
    }
}

/// Tiles the most recent season across the horizon.
///
/// Falls back to naive behavior when history is shorter than one season.
#[derive(Debug, Clone)]
pub struct SeasonalNaive {
    season_length: usize,
    season: Option<Vec<f64>>,
    sigma: f64,
}

impl SeasonalNaive {
    pub fn new(season_length: usize) -> Self {
        Self {
            season_length: season_length.max(1),
            season: None,
            sigma: 0.0,
        }
    }
}

impl DemandForecaster for SeasonalNaive {
    fn fit(&mut self, series: &RegularSeries, _exogenous: Option<&ExogenousFrame>) -> Result<()> {
        let demand = series.demand();
        if demand.is_empty() {
            return Err(PlanningError::EmptyData);
        }
        let window = self.season_length.min(demand.len());
        let season = demand[demand.len() - window..].to_vec();
        self.sigma = population_std(&season);
        self.season = Some(season);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let season = self.season.as_ref().ok_or(PlanningError::FitRequired)?;
        Ok((0..horizon).map(|i| season[i % season.len()]).collect())
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<ForecastBands> {
        let point = self.predict(horizon)?;
        let margin = interval_z(level) * self.sigma;
        let lower = point.iter().map(|p| p - margin).collect();
        let upper = point.iter().map(|p| p + margin).collect();
        Ok(ForecastBands::with_intervals(point, lower, upper))
    }

    fn name(&self) -> &'static str {
        "SeasonalNaive"
    }
}
