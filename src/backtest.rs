//! Holdout accuracy backtesting.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backends::BackendRegistry;
use crate::core::{ExogenousFrame, PlanningConfig, RegularSeries};
use crate::select::select_model;

/// Minimum history length before a backtest is attempted.
pub const MIN_BACKTEST_OBSERVATIONS: usize = 8;
const MIN_SPLIT_POINTS: usize = 3;

/// Error metrics over a held-out slice.
///
/// Every field is optional: a metric that comes out non-finite, or whose
/// denominator vanishes, is reported unset rather than as NaN.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    #[serde(rename = "MAE", skip_serializing_if = "Option::is_none")]
    pub mae: Option<f64>,
    #[serde(rename = "MSE", skip_serializing_if = "Option::is_none")]
    pub mse: Option<f64>,
    #[serde(rename = "RMSE", skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
    #[serde(rename = "WAPE", skip_serializing_if = "Option::is_none")]
    pub wape: Option<f64>,
    #[serde(rename = "SMAPE", skip_serializing_if = "Option::is_none")]
    pub smape: Option<f64>,
    #[serde(rename = "MAPE", skip_serializing_if = "Option::is_none")]
    pub mape: Option<f64>,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Point-forecast error metrics against held-out actuals.
pub fn accuracy_metrics(actual: &[f64], predicted: &[f64]) -> AccuracyMetrics {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return AccuracyMetrics::default();
    }
    let actual = &actual[..n];
    let predicted = &predicted[..n];

    let abs_errors: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .collect();

    let mae = abs_errors.iter().sum::<f64>() / n as f64;
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n as f64;
    let rmse = mse.sqrt();

    let abs_actual_sum: f64 = actual.iter().map(|a| a.abs()).sum();
    let wape = if abs_actual_sum > 0.0 {
        finite(abs_errors.iter().sum::<f64>() / abs_actual_sum * 100.0)
    } else {
        None
    };

    let smape = finite(
        actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| 2.0 * (p - a).abs() / (a.abs() + p.abs()).max(1e-8))
            .sum::<f64>()
            / n as f64
            * 100.0,
    );

    let nonzero: Vec<f64> = actual
        .iter()
        .zip(&abs_errors)
        .filter(|(a, _)| **a != 0.0)
        .map(|(a, e)| e / a.abs())
        .collect();
    let mape = if nonzero.is_empty() {
        None
    } else {
        finite(nonzero.iter().sum::<f64>() / nonzero.len() as f64 * 100.0)
    };

    AccuracyMetrics {
        mae: finite(mae),
        mse: finite(mse),
        rmse: finite(rmse),
        wape,
        smape,
        mape,
    }
}

/// Re-run selection and forecasting over an 80/20 chronological split.
///
/// Returns `None` when the history is too short for a meaningful split or
/// when any stage of the holdout pipeline fails; a SKU's plan is never
/// aborted over a backtest.
pub fn backtest_accuracy(
    series: &RegularSeries,
    exogenous: Option<&ExogenousFrame>,
    config: &PlanningConfig,
    registry: &BackendRegistry,
) -> Option<AccuracyMetrics> {
    let n = series.len();
    if n < MIN_BACKTEST_OBSERVATIONS {
        return None;
    }
    let split = n * 4 / 5;
    if split < MIN_SPLIT_POINTS || n - split < MIN_SPLIT_POINTS {
        return None;
    }

    let train = match series.slice(0, split) {
        Ok(train) => train,
        Err(error) => {
            warn!(sku = series.sku(), %error, "backtest split failed");
            return None;
        }
    };

    let selected = match select_model(&train, config, registry) {
        Ok(selected) => selected,
        Err(error) => {
            warn!(sku = series.sku(), %error, "backtest selection failed");
            return None;
        }
    };

    let train_exogenous = if selected.uses_exogenous {
        exogenous.and_then(|frame| frame.slice(0, split).ok())
    } else {
        None
    };

    let mut model = selected.create();
    if let Err(error) = model.fit(&train, train_exogenous.as_ref()) {
        warn!(sku = series.sku(), model = selected.identifier, %error, "backtest fit failed");
        return None;
    }
    let predicted = match model.predict(n - split) {
        Ok(predicted) => predicted,
        Err(error) => {
            warn!(sku = series.sku(), model = selected.identifier, %error, "backtest predict failed");
            return None;
        }
    };

    let actual = &series.demand()[split..];
    Some(accuracy_metrics(actual, &predicted))
}
