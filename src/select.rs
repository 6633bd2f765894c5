//! Model and interval-strategy selection.
//!
//! Selection is a small rule chain run once per SKU before fitting: the
//! long-seasonal availability check first, then intermittent routing, then
//! interval gating based on how much history the series can spare for
//! calibration.

use tracing::{debug, warn};

use crate::backends::{BackendRegistry, BackendSpec, BoxedForecaster, SelectionParams};
use crate::core::{ModelKind, PlanningConfig, RegularSeries};
use crate::error::{PlanningError, Result};

/// Zero-share above which a series is treated as intermittent.
pub const INTERMITTENT_THRESHOLD: f64 = 0.4;

/// Cap on conformal calibration folds.
pub const MAX_CONFORMAL_WINDOWS: usize = 5;

/// How interval bounds will be produced for the selected backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalStrategy {
    /// Not enough history for any bounds; the forecast ships points only.
    None,
    /// The backend emits its own parametric bands.
    Parametric,
    /// Split-conformal calibration over trailing holdout folds.
    Conformal { windows: usize },
}

/// Outcome of selection: a backend handle plus everything the engine needs
/// to instantiate and post-process it.
pub struct SelectedModel<'a> {
    /// Identifier reported in planning output, e.g. `"CrostonClassic"`.
    pub identifier: &'static str,
    pub kind: ModelKind,
    pub intervals: IntervalStrategy,
    /// Whether the fit should receive the exogenous frame.
    pub uses_exogenous: bool,
    /// Human-readable notes about overrides applied during selection.
    pub warnings: Vec<String>,
    pub spec: &'a BackendSpec,
    pub params: SelectionParams,
}

impl<'a> SelectedModel<'a> {
    /// Instantiate a fresh, unfitted backend.
    pub fn create(&self) -> BoxedForecaster {
        self.spec.create(&self.params)
    }
}

/// Choose the backend and interval strategy for a series.
///
/// The configured model is a preference, not a guarantee: heavily
/// intermittent series are routed to Croston regardless of the request, and
/// an unavailable long-seasonal backend falls back to exponential smoothing.
pub fn select_model<'a>(
    series: &RegularSeries,
    config: &PlanningConfig,
    registry: &'a BackendRegistry,
) -> Result<SelectedModel<'a>> {
    let mut kind = config.model;
    let mut warnings = Vec::new();

    if kind == ModelKind::LongSeasonal
        && (!config.enable_long_seasonal || registry.get(kind).is_none())
    {
        warn!(
            sku = series.sku(),
            "long-seasonal backend unavailable, falling back to AutoETS"
        );
        warnings.push("long-seasonal backend unavailable; using AutoETS".to_string());
        kind = ModelKind::AutoEts;
    }

    // Only a successfully-selected long-seasonal backend bypasses the
    // intermittency check; its fallback is rerouted like any other model.
    if kind != ModelKind::LongSeasonal {
        let zero_ratio = series.zero_ratio();
        if zero_ratio >= INTERMITTENT_THRESHOLD && !kind.is_intermittent() {
            warn!(
                sku = series.sku(),
                zero_ratio, requested = ?kind,
                "intermittent demand detected, routing to Croston"
            );
            warnings.push(format!(
                "series is {:.0}% zeros; overriding {} with CrostonClassic",
                zero_ratio * 100.0,
                kind.as_str(),
            ));
            kind = ModelKind::CrostonClassic;
        }
    }

    let spec = registry
        .get(kind)
        .ok_or_else(|| PlanningError::BackendUnavailable(kind.as_str().to_string()))?;

    let params = SelectionParams {
        season_length: config
            .seasonal_length
            .or_else(|| config.frequency.derived_season_length()),
        seasonal_periods: config.frequency.long_seasonal_periods(),
    };

    let intervals = if spec.native_intervals {
        IntervalStrategy::Parametric
    } else if series.len() >= 2 * config.horizon {
        let windows = (series.len() / config.horizon).min(MAX_CONFORMAL_WINDOWS);
        IntervalStrategy::Conformal { windows }
    } else {
        IntervalStrategy::None
    };

    debug!(
        sku = series.sku(),
        model = spec.name,
        ?intervals,
        "selected forecast backend"
    );

    Ok(SelectedModel {
        identifier: spec.name,
        kind,
        intervals,
        uses_exogenous: config.use_exogenous && spec.accepts_exogenous,
        warnings,
        spec,
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Frequency;
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

    fn dense_series(len: usize) -> RegularSeries {
        make_series(&(0..len).map(|i| 10.0 + (i % 3) as f64).collect::<Vec<_>>())
    }

    #[test]
    fn intermittent_series_overrides_the_requested_model() {
        // 50% zeros, above the threshold.
        let values: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 5.0 } else { 0.0 }).collect();
        let series = make_series(&values);
        let config = PlanningConfig {
            model: ModelKind::AutoArima,
            ..PlanningConfig::default()
        };
        let registry = BackendRegistry::standard();
        let selected = select_model(&series, &config, &registry).unwrap();
        assert_eq!(selected.kind, ModelKind::CrostonClassic);
        assert_eq!(selected.identifier, "CrostonClassic");
        assert!(!selected.warnings.is_empty());
    }

    #[test]
    fn explicit_croston_request_is_not_rerouted() {
        let values: Vec<f64> = (0..20).map(|i| if i % 3 == 0 { 4.0 } else { 0.0 }).collect();
        let series = make_series(&values);
        let config = PlanningConfig {
            model: ModelKind::CrostonSba,
            ..PlanningConfig::default()
        };
        let registry = BackendRegistry::standard();
        let selected = select_model(&series, &config, &registry).unwrap();
        assert_eq!(selected.kind, ModelKind::CrostonSba);
        assert!(selected.warnings.is_empty());
    }

    #[test]
    fn long_seasonal_falls_back_when_disabled() {
        let series = dense_series(60);
        let config = PlanningConfig {
            model: ModelKind::LongSeasonal,
            enable_long_seasonal: false,
            ..PlanningConfig::default()
        };
        let registry = BackendRegistry::standard();
        let selected = select_model(&series, &config, &registry).unwrap();
        assert_eq!(selected.kind, ModelKind::AutoEts);
        assert_eq!(selected.identifier, "AutoETS");
        assert!(!selected.warnings.is_empty());
    }

    #[test]
    fn long_seasonal_fallback_is_still_rerouted_when_intermittent() {
        // 25 of 40 periods are zero; the AutoETS fallback must not shield
        // the series from intermittency routing.
        let values: Vec<f64> = (0..40)
            .map(|i| if i % 8 < 5 { 0.0 } else { 6.0 })
            .collect();
        let series = make_series(&values);
        let config = PlanningConfig {
            model: ModelKind::LongSeasonal,
            enable_long_seasonal: false,
            ..PlanningConfig::default()
        };
        let registry = BackendRegistry::standard();
        let selected = select_model(&series, &config, &registry).unwrap();
        assert_eq!(selected.kind, ModelKind::CrostonClassic);
        assert_eq!(selected.identifier, "CrostonClassic");
        assert_eq!(selected.warnings.len(), 2);
    }

    #[test]
    fn missing_fallback_is_a_hard_error() {
        let series = dense_series(30);
        let config = PlanningConfig {
            model: ModelKind::AutoEts,
            ..PlanningConfig::default()
        };
        let registry = BackendRegistry::empty();
        assert!(matches!(
            select_model(&series, &config, &registry),
            Err(PlanningError::BackendUnavailable(_))
        ));
    }

    #[test]
    fn native_interval_backends_use_parametric_bands() {
        let series = dense_series(30);
        let config = PlanningConfig {
            model: ModelKind::Naive,
            horizon: 7,
            ..PlanningConfig::default()
        };
        let registry = BackendRegistry::standard();
        let selected = select_model(&series, &config, &registry).unwrap();
        assert_eq!(selected.intervals, IntervalStrategy::Parametric);
    }

    #[test]
    fn conformal_gating_depends_on_history_length() {
        let registry = BackendRegistry::standard();
        let config = PlanningConfig {
            model: ModelKind::CrostonClassic,
            horizon: 10,
            ..PlanningConfig::default()
        };

        let sparse: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 3.0 } else { 0.0 }).collect();
        let long = make_series(&sparse);
        let selected = select_model(&long, &config, &registry).unwrap();
        assert_eq!(selected.intervals, IntervalStrategy::Conformal { windows: 4 });

        let short = make_series(&sparse[..15]);
        let selected = select_model(&short, &config, &registry).unwrap();
        assert_eq!(selected.intervals, IntervalStrategy::None);
    }

    #[test]
    fn conformal_windows_are_capped() {
        let registry = BackendRegistry::standard();
        let config = PlanningConfig {
            model: ModelKind::CrostonClassic,
            horizon: 5,
            ..PlanningConfig::default()
        };
        let sparse: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 3.0 } else { 0.0 }).collect();
        let series = make_series(&sparse);
        let selected = select_model(&series, &config, &registry).unwrap();
        assert_eq!(
            selected.intervals,
            IntervalStrategy::Conformal {
                windows: MAX_CONFORMAL_WINDOWS
            }
        );
    }

    #[test]
    fn explicit_seasonal_length_wins_over_the_derived_default() {
        let series = dense_series(30);
        let config = PlanningConfig {
            model: ModelKind::SeasonalNaive,
            frequency: Frequency::Weekly,
            seasonal_length: Some(13),
            ..PlanningConfig::default()
        };
        let registry = BackendRegistry::standard();
        let selected = select_model(&series, &config, &registry).unwrap();
        assert_eq!(selected.params.season_length, Some(13));
    }
}
