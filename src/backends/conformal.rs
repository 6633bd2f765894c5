//! Split-conformal interval bands for backends without native intervals.

use crate::backends::{BackendSpec, SelectionParams};
use crate::core::{ForecastBands, RegularSeries};
use crate::error::Result;

/// Wrap a point forecast in distribution-free bands.
///
/// The series tail is split into `windows` non-overlapping holdout folds of
/// `horizon` periods each. For every fold a fresh backend instance is fitted
/// on the preceding history and its absolute holdout residuals are pooled;
/// the empirical `level` quantile of the pool becomes a symmetric band width
/// around the point forecast. Folds whose training slice is empty are
/// skipped. When no residuals can be collected the points are returned
/// without bands rather than failing the plan.
pub fn conformal_bands(
    spec: &BackendSpec,
    params: &SelectionParams,
    series: &RegularSeries,
    point: Vec<f64>,
    horizon: usize,
    level: f64,
    windows: usize,
) -> Result<ForecastBands> {
    let n = series.len();
    let mut residuals = Vec::new();

    for fold in 1..=windows {
        let test_end = n - (fold - 1) * horizon;
        let test_start = test_end.saturating_sub(horizon);
        if test_start == 0 {
            break;
        }
        let train = series.slice(0, test_start)?;
        let mut model = spec.create(params);
        if model.fit(&train, None).is_err() {
            continue;
        }
        let predicted = match model.predict(test_end - test_start) {
            Ok(values) => values,
            Err(_) => continue,
        };
        let actual = &series.demand()[test_start..test_end];
        for (a, p) in actual.iter().zip(&predicted) {
            residuals.push((a - p).abs());
        }
    }

    if residuals.is_empty() {
        return Ok(ForecastBands::from_points(point));
    }

    let width = quantile(&mut residuals, level);
    let lower = point.iter().map(|p| (p - width).max(0.0)).collect();
    let upper = point.iter().map(|p| p + width).collect();
    Ok(ForecastBands::with_intervals(point, lower, upper))
}

/// Empirical quantile with the conformal finite-sample correction.
fn quantile(values: &mut [f64], level: f64) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let m = values.len();
    let rank = ((m as f64 + 1.0) * level).ceil() as usize;
    values[rank.clamp(1, m) - 1]
}
