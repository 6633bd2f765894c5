//! Forecast backends behind a single trait, wired through a named registry.
//!
//! Every backend is a deliberately lightweight stand-in for the heavyweight
//! statistical model it is named after; the registry seam is what the rest
//! of the engine depends on, so richer implementations can replace these
//! without touching selection or planning code.

mod baseline;
mod conformal;
mod intermittent;
#[cfg(feature = "long-seasonal")]
mod long_seasonal;
mod smoothing;
mod trend;

pub use baseline::{Naive, SeasonalNaive};
pub use conformal::conformal_bands;
pub use intermittent::{Croston, CrostonVariant};
#[cfg(feature = "long-seasonal")]
pub use long_seasonal::LongSeasonal;
pub use smoothing::AutoSmoothing;
pub use trend::TrendRegression;

use statrs::distribution::{ContinuousCDF, Normal};

use crate::core::{ExogenousFrame, ForecastBands, ModelKind, RegularSeries};
use crate::error::Result;

/// Common interface for all forecast backends.
///
/// Object-safe; the engine works with `Box<dyn DemandForecaster>`.
pub trait DemandForecaster {
    /// Fit the backend to a regularized series. Backends that are not
    /// exogenous-capable ignore the frame.
    fn fit(&mut self, series: &RegularSeries, exogenous: Option<&ExogenousFrame>) -> Result<()>;

    /// Point predictions for the horizon.
    fn predict(&self, horizon: usize) -> Result<Vec<f64>>;

    /// Predictions with parametric interval bands at the central coverage
    /// `level`. Backends without native intervals return points only.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<ForecastBands> {
        let _ = level;
        Ok(ForecastBands::from_points(self.predict(horizon)?))
    }

    /// Human-readable identifier used to locate this backend's output.
    fn name(&self) -> &'static str;

    /// Whether the last fit actually consumed exogenous regressors.
    fn used_exogenous(&self) -> bool {
        false
    }
}

/// Type alias for boxed backend trait objects.
pub type BoxedForecaster = Box<dyn DemandForecaster>;

/// Seasonal parameters resolved by the selector before instantiation.
#[derive(Debug, Clone, Default)]
pub struct SelectionParams {
    /// Seasonal length for single-season backends.
    pub season_length: Option<usize>,
    /// Period set for the long-seasonal backend.
    pub seasonal_periods: Vec<usize>,
}

/// A named backend with its static capabilities and a factory.
pub struct BackendSpec {
    pub kind: ModelKind,
    pub name: &'static str,
    /// Whether the backend produces parametric intervals natively. Backends
    /// without native intervals are candidates for conformal bands.
    pub native_intervals: bool,
    /// Static exogenous eligibility; only listed backends ever receive the
    /// frame, regardless of whether one is present.
    pub accepts_exogenous: bool,
    factory: Box<dyn Fn(&SelectionParams) -> BoxedForecaster + Send + Sync>,
}

impl BackendSpec {
    pub fn new<F>(
        kind: ModelKind,
        name: &'static str,
        native_intervals: bool,
        accepts_exogenous: bool,
        factory: F,
    ) -> Self
    where
        F: Fn(&SelectionParams) -> BoxedForecaster + Send + Sync + 'static,
    {
        Self {
            kind,
            name,
            native_intervals,
            accepts_exogenous,
            factory: Box::new(factory),
        }
    }

    /// Create a fresh backend instance.
    pub fn create(&self, params: &SelectionParams) -> BoxedForecaster {
        (self.factory)(params)
    }
}

/// Registry of available backends, discovered once per engine.
///
/// Optional backends are simply absent from the registry; the selector
/// treats a missing entry as an ordinary fallback branch.
pub struct BackendRegistry {
    specs: Vec<BackendSpec>,
}

impl BackendRegistry {
    pub fn empty() -> Self {
        Self { specs: Vec::new() }
    }

    pub fn register(&mut self, spec: BackendSpec) {
        self.specs.push(spec);
    }

    pub fn get(&self, kind: ModelKind) -> Option<&BackendSpec> {
        self.specs.iter().find(|s| s.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendSpec> {
        self.specs.iter()
    }

    /// The standard registry: every backend this crate ships, with the
    /// long-seasonal entry present only when compiled in.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(BackendSpec::new(
            ModelKind::AutoArima,
            "AutoARIMA",
            true,
            true,
            |_| Box::new(TrendRegression::new()),
        ));
        registry.register(BackendSpec::new(
            ModelKind::AutoEts,
            "AutoETS",
            true,
            false,
            |p| Box::new(AutoSmoothing::new(p.season_length)),
        ));
        registry.register(BackendSpec::new(
            ModelKind::SeasonalNaive,
            "SeasonalNaive",
            true,
            false,
            |p| Box::new(SeasonalNaive::new(p.season_length.unwrap_or(7))),
        ));
        registry.register(BackendSpec::new(
            ModelKind::Naive,
            "Naive",
            true,
            false,
            |_| Box::new(Naive::new()),
        ));
        registry.register(BackendSpec::new(
            ModelKind::CrostonClassic,
            "CrostonClassic",
            false,
            false,
            |_| Box::new(Croston::new(CrostonVariant::Classic)),
        ));
        registry.register(BackendSpec::new(
            ModelKind::CrostonOptimized,
            "CrostonOptimized",
            false,
            false,
            |_| Box::new(Croston::new(CrostonVariant::Optimized)),
        ));
        registry.register(BackendSpec::new(
            ModelKind::CrostonSba,
            "CrostonSBA",
            false,
            false,
            |_| Box::new(Croston::new(CrostonVariant::Sba)),
        ));
        #[cfg(feature = "long-seasonal")]
        registry.register(BackendSpec::new(
            ModelKind::LongSeasonal,
            "LongSeasonal",
            true,
            false,
            |p| Box::new(LongSeasonal::new(p.seasonal_periods.clone())),
        ));
        registry
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / values.len() as f64).sqrt()
}

/// z-score for a central interval with the given coverage level.
pub(crate) fn interval_z(level: f64) -> f64 {
    let p = 0.5 + level.clamp(0.0, 0.999) / 2.0;
    let normal = Normal::new(0.0, 1.0).unwrap();
    normal.inverse_cdf(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_series(values: &[f64]) -> RegularSeries {
        RegularSeries::new(
            "SKU-1",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            crate::core::Frequency::Daily,
            values.to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn standard_registry_covers_required_kinds() {
        let registry = BackendRegistry::standard();
        for kind in [
            ModelKind::AutoArima,
            ModelKind::AutoEts,
            ModelKind::SeasonalNaive,
            ModelKind::Naive,
            ModelKind::CrostonClassic,
            ModelKind::CrostonOptimized,
            ModelKind::CrostonSba,
        ] {
            assert!(registry.get(kind).is_some(), "{kind:?} missing");
        }
    }

    #[cfg(feature = "long-seasonal")]
    #[test]
    fn long_seasonal_is_registered_when_compiled() {
        let registry = BackendRegistry::standard();
        assert!(registry.get(ModelKind::LongSeasonal).is_some());
    }

    #[test]
    fn croston_family_has_no_native_intervals() {
        let registry = BackendRegistry::standard();
        for kind in [
            ModelKind::CrostonClassic,
            ModelKind::CrostonOptimized,
            ModelKind::CrostonSba,
        ] {
            assert!(!registry.get(kind).unwrap().native_intervals);
        }
    }

    #[test]
    fn only_auto_arima_accepts_exogenous() {
        let registry = BackendRegistry::standard();
        for spec in registry.iter() {
            assert_eq!(spec.accepts_exogenous, spec.kind == ModelKind::AutoArima);
        }
    }

    #[test]
    fn spec_creates_independent_instances() {
        let registry = BackendRegistry::standard();
        let spec = registry.get(ModelKind::Naive).unwrap();
        let params = SelectionParams::default();

        let mut first = spec.create(&params);
        let second = spec.create(&params);

        first.fit(&make_series(&[1.0, 2.0, 3.0]), None).unwrap();
        assert!(first.predict(1).is_ok());
        assert!(matches!(
            second.predict(1),
            Err(crate::error::PlanningError::FitRequired)
        ));
    }

    #[test]
    fn interval_z_matches_known_quantiles() {
        assert_relative_eq!(interval_z(0.95), 1.96, epsilon = 1e-2);
        assert_relative_eq!(interval_z(0.90), 1.645, epsilon = 1e-2);
    }
}
