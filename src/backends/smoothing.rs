//! Automatic exponential-smoothing backend.

use crate::backends::{interval_z, mean, population_std, DemandForecaster};
use crate::core::{ExogenousFrame, ForecastBands, RegularSeries};
use crate::error::{PlanningError, Result};

const ALPHA: f64 = 0.3;
const TREND_DAMPING: f64 = 0.1;

/// Simple exponential smoothing with a damped recent trend and an optional
/// additive seasonal adjustment.
///
/// The seasonal component is used only when at least two full seasons of
/// history are available.
#[derive(Debug, Clone, Default)]
pub struct AutoSmoothing {
    season_length: Option<usize>,
    level: Option<f64>,
    trend: f64,
    seasonal: Option<Vec<f64>>,
    n: usize,
    sigma: f64,
}

impl AutoSmoothing {
    pub fn new(season_length: Option<usize>) -> Self {
        Self {
            season_length,
            ..Self::default()
        }
    }
}

impl DemandForecaster for AutoSmoothing {
    fn fit(&mut self, series: &RegularSeries, _exogenous: Option<&ExogenousFrame>) -> Result<()> {
        let demand = series.demand();
        if demand.is_empty() {
            return Err(PlanningError::EmptyData);
        }

        let mut smoothed = Vec::with_capacity(demand.len());
        let mut level = demand[0];
        smoothed.push(level);
        for &y in &demand[1..] {
            level = ALPHA * y + (1.0 - ALPHA) * level;
            smoothed.push(level);
        }

        self.trend = if demand.len() > 5 {
            let tail = &demand[demand.len() - 5..];
            tail.windows(2).map(|w| w[1] - w[0]).sum::<f64>() / 4.0
        } else {
            0.0
        };

        self.seasonal = self.season_length.and_then(|m| {
            if m >= 2 && demand.len() >= 2 * m {
                let overall = mean(demand);
                let mut indices = vec![0.0; m];
                let mut counts = vec![0usize; m];
                for (i, &y) in demand.iter().enumerate() {
                    indices[i % m] += y - overall;
                    counts[i % m] += 1;
                }
                for (idx, count) in indices.iter_mut().zip(&counts) {
                    *idx /= (*count).max(1) as f64;
                }
                Some(indices)
            } else {
                None
            }
        });

        let residuals: Vec<f64> = demand
            .iter()
            .zip(&smoothed)
            .map(|(y, s)| y - s)
            .collect();
        self.sigma = population_std(&residuals);
        self.n = demand.len();
        self.level = Some(level);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let level = self.level.ok_or(PlanningError::FitRequired)?;
        Ok((0..horizon)
            .map(|i| {
                let mut value = level + self.trend * TREND_DAMPING * (i + 1) as f64;
                if let Some(seasonal) = &self.seasonal {
                    value += seasonal[(self.n + i) % seasonal.len()];
                }
                value.max(0.0)
            })
            .collect())
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<ForecastBands> {
        let point = self.predict(horizon)?;
        let z = interval_z(level);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (i, &p) in point.iter().enumerate() {
            let margin = z * self.sigma * (1.0 + (i + 1) as f64 * 0.05).sqrt();
            lower.push((p - margin).max(0.0));
            upper.push(p + margin);
        }
        Ok(ForecastBands::with_intervals(point, lower, upper))
    }

    fn name(&self) -> &'static str {
        "AutoETS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Frequency;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_series(values: &[f64]) -> RegularSeries {
        RegularSeries::new(
            "SKU-1",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            Frequency::Daily,
            values.to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn constant_series_forecasts_the_constant() {
        let mut model = AutoSmoothing::new(None);
        model.fit(&make_series(&[10.0; 12]), None).unwrap();
        let forecast = model.predict(5).unwrap();
        for value in forecast {
            assert_relative_eq!(value, 10.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn forecasts_are_non_negative() {
        let mut model = AutoSmoothing::new(None);
        model
            .fit(&make_series(&[50.0, 40.0, 30.0, 20.0, 10.0, 5.0, 1.0]), None)
            .unwrap();
        for value in model.predict(30).unwrap() {
            assert!(value >= 0.0);
        }
    }

    #[test]
    fn rising_series_carries_damped_trend() {
        let values: Vec<f64> = (1..=12).map(|i| i as f64 * 10.0).collect();
        let mut model = AutoSmoothing::new(None);
        model.fit(&make_series(&values), None).unwrap();
        let forecast = model.predict(4).unwrap();
        for pair in forecast.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn seasonal_adjustment_needs_two_full_seasons() {
        let seasonal_values: Vec<f64> = (0..8).map(|i| if i % 4 == 0 { 20.0 } else { 5.0 }).collect();
        let mut with_season = AutoSmoothing::new(Some(4));
        with_season.fit(&make_series(&seasonal_values), None).unwrap();
        assert!(with_season.seasonal.is_some());

        let mut short = AutoSmoothing::new(Some(4));
        short.fit(&make_series(&seasonal_values[..6]), None).unwrap();
        assert!(short.seasonal.is_none());
    }

    #[test]
    fn intervals_widen_with_horizon() {
        let values: Vec<f64> = (0..20).map(|i| 10.0 + (i as f64).sin() * 2.0).collect();
        let mut model = AutoSmoothing::new(None);
        model.fit(&make_series(&values), None).unwrap();
        let bands = model.predict_with_intervals(6, 0.95).unwrap();
        let lower = bands.lower.unwrap();
        let upper = bands.upper.unwrap();
        let first = upper[0] - lower[0];
        let last = upper[5] - lower[5];
        assert!(last > first);
    }
}
