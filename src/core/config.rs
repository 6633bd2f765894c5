//! Planning configuration and per-SKU context.

use serde::{Deserialize, Serialize};

use crate::error::{PlanningError, Result};

/// Calendar step of a regularized demand series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Frequency {
    /// Daily observations.
    #[default]
    #[serde(rename = "D")]
    Daily,
    /// Weekly observations.
    #[serde(rename = "W")]
    Weekly,
    /// Monthly observations.
    #[serde(rename = "M")]
    Monthly,
}

impl Frequency {
    /// Nominal days per period, used for lead-time conversions.
    pub fn step_days(self) -> u32 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 30,
        }
    }

    /// Advance a date by `steps` periods.
    pub fn advance(self, date: chrono::NaiveDate, steps: usize) -> chrono::NaiveDate {
        match self {
            Frequency::Daily => date + chrono::Duration::days(steps as i64),
            Frequency::Weekly => date + chrono::Duration::weeks(steps as i64),
            Frequency::Monthly => date + chrono::Months::new(steps as u32),
        }
    }

    /// Number of whole periods between two dates (`end >= start`).
    ///
    /// Monthly counting is calendar-based: any day within a later month
    /// lands in that month's bucket.
    pub fn periods_between(self, start: chrono::NaiveDate, end: chrono::NaiveDate) -> usize {
        use chrono::Datelike;
        let days = (end - start).num_days().max(0);
        match self {
            Frequency::Daily => days as usize,
            Frequency::Weekly => (days / 7) as usize,
            Frequency::Monthly => {
                let months = (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
                months.max(0) as usize
            }
        }
    }

    /// Default seasonal length attached where a backend supports one.
    pub fn derived_season_length(self) -> Option<usize> {
        match self {
            Frequency::Daily => None,
            Frequency::Weekly => Some(52),
            Frequency::Monthly => Some(12),
        }
    }

    /// Seasonal periods handed to the long-seasonal backend.
    pub fn long_seasonal_periods(self) -> Vec<usize> {
        match self {
            Frequency::Daily => vec![7, 30],
            Frequency::Weekly => vec![52],
            Frequency::Monthly => vec![12],
        }
    }
}

/// Forecast backend requested by the caller.
///
/// Wire names match the upstream model identifiers so configs survive the
/// round trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelKind {
    #[default]
    #[serde(rename = "AutoARIMA")]
    AutoArima,
    #[serde(rename = "AutoETS")]
    AutoEts,
    SeasonalNaive,
    Naive,
    CrostonClassic,
    CrostonOptimized,
    #[serde(rename = "CrostonSBA")]
    CrostonSba,
    LongSeasonal,
}

impl ModelKind {
    /// Wire-format name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::AutoArima => "AutoARIMA",
            ModelKind::AutoEts => "AutoETS",
            ModelKind::SeasonalNaive => "SeasonalNaive",
            ModelKind::Naive => "Naive",
            ModelKind::CrostonClassic => "CrostonClassic",
            ModelKind::CrostonOptimized => "CrostonOptimized",
            ModelKind::CrostonSba => "CrostonSBA",
            ModelKind::LongSeasonal => "LongSeasonal",
        }
    }

    /// Whether the backend is an intermittent-demand specialist.
    pub fn is_intermittent(self) -> bool {
        matches!(
            self,
            ModelKind::CrostonClassic | ModelKind::CrostonOptimized | ModelKind::CrostonSba
        )
    }
}

/// Immutable per-run planning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Preferred forecast backend; the selector may override it.
    pub model: ModelKind,
    /// Forecast horizon in periods (1–365).
    pub horizon: usize,
    /// Calendar step of the demand series.
    pub frequency: Frequency,
    /// Central prediction-interval coverage (0.5–0.99).
    pub confidence_level: f64,
    /// Explicit seasonal length; wins over the frequency-derived default.
    pub seasonal_length: Option<usize>,
    /// Target service level for safety stock (0.5–0.999).
    pub service_level: f64,
    /// Lead time applied when a SKU carries no specific value.
    pub default_lead_time_days: u32,
    /// Attempt the long-seasonal backend when it is available.
    pub enable_long_seasonal: bool,
    /// Hand the exogenous frame to backends that accept one.
    pub use_exogenous: bool,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::AutoArima,
            horizon: 90,
            frequency: Frequency::Daily,
            confidence_level: 0.95,
            seasonal_length: None,
            service_level: 0.95,
            default_lead_time_days: 7,
            enable_long_seasonal: false,
            use_exogenous: false,
        }
    }
}

impl PlanningConfig {
    /// Validate parameter ranges before any per-SKU work starts.
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 || self.horizon > 365 {
            return Err(PlanningError::InvalidParameter(format!(
                "horizon must be in 1..=365, got {}",
                self.horizon
            )));
        }
        if !(0.5..=0.99).contains(&self.confidence_level) {
            return Err(PlanningError::InvalidParameter(format!(
                "confidence_level must be in [0.5, 0.99], got {}",
                self.confidence_level
            )));
        }
        if !(0.5..=0.999).contains(&self.service_level) {
            return Err(PlanningError::InvalidParameter(format!(
                "service_level must be in [0.5, 0.999], got {}",
                self.service_level
            )));
        }
        if let Some(m) = self.seasonal_length {
            if m == 0 {
                return Err(PlanningError::InvalidParameter(
                    "seasonal_length must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Per-SKU planning inputs: lead time and optional on-hand snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuContext {
    pub sku: String,
    /// Days between placing a reorder and stock arriving.
    pub lead_time_days: u32,
    /// Measured on-hand quantity; when absent the engine estimates one.
    pub on_hand: Option<f64>,
}

impl SkuContext {
    pub fn new(sku: impl Into<String>, lead_time_days: u32) -> Self {
        Self {
            sku: sku.into(),
            lead_time_days,
            on_hand: None,
        }
    }

    /// Context carrying only the shared defaults from the config.
    pub fn with_defaults(sku: impl Into<String>, config: &PlanningConfig) -> Self {
        Self::new(sku, config.default_lead_time_days)
    }

    pub fn with_on_hand(mut self, on_hand: f64) -> Self {
        self.on_hand = Some(on_hand);
        self
    }
}
