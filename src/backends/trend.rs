//! Automatic trend-regression backend.
//!
//! Stands in for an auto-ARIMA model: a least-squares polynomial trend over
//! the time index, optionally augmented with exogenous regressor columns.
//! This is the only backend in the registry that is exogenous-eligible.

use crate::backends::{interval_z, population_std, DemandForecaster};
use crate::core::{ExogenousFrame, ForecastBands, RegularSeries};
use crate::error::{PlanningError, Result};

/// Polynomial trend regression with optional exogenous regressors.
#[derive(Debug, Clone, Default)]
pub struct TrendRegression {
    coefficients: Option<Vec<f64>>,
    degree: usize,
    /// Last observed exogenous row, held constant across the horizon.
    exog_tail: Vec<f64>,
    used_exogenous: bool,
    n: usize,
    sigma: f64,
}

impl TrendRegression {
    pub fn new() -> Self {
        Self::default()
    }

    fn design_row(&self, t: f64, exog: &[f64]) -> Vec<f64> {
        let mut row = Vec::with_capacity(1 + self.degree + exog.len());
        row.push(1.0);
        for d in 1..=self.degree {
            row.push(t.powi(d as i32));
        }
        row.extend_from_slice(exog);
        row
    }

    fn predict_value(&self, t: f64) -> Result<f64> {
        let beta = self.coefficients.as_ref().ok_or(PlanningError::FitRequired)?;
        let row = self.design_row(t, &self.exog_tail);
        Ok(row.iter().zip(beta).map(|(x, b)| x * b).sum::<f64>().max(0.0))
    }
}

impl DemandForecaster for TrendRegression {
    fn fit(&mut self, series: &RegularSeries, exogenous: Option<&ExogenousFrame>) -> Result<()> {
        let demand = series.demand();
        if demand.is_empty() {
            return Err(PlanningError::EmptyData);
        }
        let n = demand.len();
        self.degree = 2.min(n - 1);
        self.n = n;

        let exog_columns: Vec<&[f64]> = match exogenous {
            Some(frame) if !frame.is_empty() => {
                if frame.len() != n {
                    return Err(PlanningError::DimensionMismatch {
                        expected: n,
                        got: frame.len(),
                    });
                }
                frame.columns().map(|(_, values)| values).collect()
            }
            _ => Vec::new(),
        };
        self.used_exogenous = !exog_columns.is_empty();
        self.exog_tail = exog_columns.iter().map(|c| c[n - 1]).collect();

        let rows: Vec<Vec<f64>> = (0..n)
            .map(|t| {
                let exog_row: Vec<f64> = exog_columns.iter().map(|c| c[t]).collect();
                self.design_row(t as f64, &exog_row)
            })
            .collect();

        let beta = least_squares(&rows, demand).ok_or_else(|| {
            PlanningError::BackendComputation("trend regression system is singular".to_string())
        })?;

        let residuals: Vec<f64> = rows
            .iter()
            .zip(demand)
            .map(|(row, y)| y - row.iter().zip(&beta).map(|(x, b)| x * b).sum::<f64>())
            .collect();
        self.sigma = population_std(&residuals);
        self.coefficients = Some(beta);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        (0..horizon)
            .map(|i| self.predict_value((self.n + i) as f64))
            .collect()
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<ForecastBands> {
        let point = self.predict(horizon)?;
        let z = interval_z(level);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (i, &p) in point.iter().enumerate() {
            let margin = z * self.sigma * (1.0 + (i + 1) as f64 * 0.1).sqrt();
            lower.push((p - margin).max(0.0));
            upper.push(p + margin);
        }
        Ok(ForecastBands::with_intervals(point, lower, upper))
    }

    fn name(&self) -> &'static str {
        "AutoARIMA"
    }

    fn used_exogenous(&self) -> bool {
        self.used_exogenous
    }
}

/// Solve the normal equations for `X·beta ≈ y`.
///
/// A small ridge term keeps the system solvable when columns are collinear
/// (constant exogenous flags, degenerate time ranges).
fn least_squares(rows: &[Vec<f64>], y: &[f64]) -> Option<Vec<f64>> {
    let k = rows.first()?.len();
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &target) in rows.iter().zip(y) {
        for i in 0..k {
            xty[i] += row[i] * target;
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for (i, row) in xtx.iter_mut().enumerate() {
        row[i] += 1e-8;
    }
    solve(xtx, xty)
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for j in col..n {
                a[row][j] -= factor * a[col][j];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for j in row + 1..n {
            sum -= a[row][j] * x[j];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}
