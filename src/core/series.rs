//! Regularized demand series and aligned exogenous regressors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::Frequency;
use crate::error::{PlanningError, Result};

/// A single raw demand reading for one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandObservation {
    pub sku: String,
    pub date: NaiveDate,
    /// Units demanded in the period; must be finite and non-negative.
    pub quantity: f64,
}

impl DemandObservation {
    pub fn new(sku: impl Into<String>, date: NaiveDate, quantity: f64) -> Self {
        Self {
            sku: sku.into(),
            date,
            quantity,
        }
    }
}

/// A per-SKU demand series on a fixed calendar step with no gaps.
///
/// Timestamps are implicit: period `i` falls on `frequency.advance(start, i)`,
/// which keeps the evenly-spaced invariant true by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularSeries {
    sku: String,
    start: NaiveDate,
    frequency: Frequency,
    demand: Vec<f64>,
}

impl RegularSeries {
    /// Build a series, validating that every demand value is finite and
    /// non-negative. A length-1 series is valid; an empty one is not.
    pub fn new(
        sku: impl Into<String>,
        start: NaiveDate,
        frequency: Frequency,
        demand: Vec<f64>,
    ) -> Result<Self> {
        if demand.is_empty() {
            return Err(PlanningError::EmptyData);
        }
        if let Some(bad) = demand.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(PlanningError::InvalidParameter(format!(
                "demand values must be finite and non-negative, got {bad}"
            )));
        }
        Ok(Self {
            sku: sku.into(),
            start,
            frequency,
            demand,
        })
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn len(&self) -> usize {
        self.demand.len()
    }

    pub fn is_empty(&self) -> bool {
        self.demand.is_empty()
    }

    pub fn demand(&self) -> &[f64] {
        &self.demand
    }

    /// Date of the period at `index`.
    pub fn timestamp(&self, index: usize) -> NaiveDate {
        self.frequency.advance(self.start, index)
    }

    /// Date of the final observed period.
    pub fn last_date(&self) -> NaiveDate {
        self.timestamp(self.demand.len() - 1)
    }

    /// Materialize the full date axis.
    pub fn timestamps(&self) -> Vec<NaiveDate> {
        (0..self.demand.len()).map(|i| self.timestamp(i)).collect()
    }

    /// Sub-series over `[start_index, end_index)`, keeping the calendar.
    pub fn slice(&self, start_index: usize, end_index: usize) -> Result<RegularSeries> {
        if start_index >= end_index || end_index > self.demand.len() {
            return Err(PlanningError::InvalidParameter(format!(
                "invalid slice {start_index}..{end_index} of series with {} periods",
                self.demand.len()
            )));
        }
        Ok(RegularSeries {
            sku: self.sku.clone(),
            start: self.timestamp(start_index),
            frequency: self.frequency,
            demand: self.demand[start_index..end_index].to_vec(),
        })
    }

    /// Fraction of zero-demand periods, used for intermittency routing.
    pub fn zero_ratio(&self) -> f64 {
        let zeros = self.demand.iter().filter(|v| **v == 0.0).count();
        zeros as f64 / self.demand.len() as f64
    }

    pub fn mean(&self) -> f64 {
        self.demand.iter().sum::<f64>() / self.demand.len() as f64
    }
}

/// Named regressor columns aligned to a regular series' date axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExogenousFrame {
    len: usize,
    columns: Vec<(String, Vec<f64>)>,
}

impl ExogenousFrame {
    /// Empty frame for an axis of `len` periods.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            columns: Vec::new(),
        }
    }

    /// Add a column; its length must match the axis.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if values.len() != self.len {
            return Err(PlanningError::DimensionMismatch {
                expected: self.len,
                got: values.len(),
            });
        }
        self.columns.push((name.into(), values));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Sub-frame over `[start_index, end_index)`.
    pub fn slice(&self, start_index: usize, end_index: usize) -> Result<ExogenousFrame> {
        if start_index > end_index || end_index > self.len {
            return Err(PlanningError::InvalidParameter(format!(
                "invalid slice {start_index}..{end_index} of frame with {} rows",
                self.len
            )));
        }
        Ok(ExogenousFrame {
            len: end_index - start_index,
            columns: self
                .columns
                .iter()
                .map(|(name, values)| (name.clone(), values[start_index..end_index].to_vec()))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn series_rejects_empty_and_negative_demand() {
        assert!(matches!(
            RegularSeries::new("A", date(2024, 1, 1), Frequency::Daily, vec![]),
            Err(PlanningError::EmptyData)
        ));
        assert!(RegularSeries::new("A", date(2024, 1, 1), Frequency::Daily, vec![1.0, -2.0]).is_err());
        assert!(RegularSeries::new("A", date(2024, 1, 1), Frequency::Daily, vec![f64::NAN]).is_err());
    }

    #[test]
    fn single_period_series_is_valid() {
        let series =
            RegularSeries::new("A", date(2024, 1, 1), Frequency::Daily, vec![5.0]).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.last_date(), date(2024, 1, 1));
    }

    #[test]
    fn timestamps_are_strictly_increasing_and_evenly_spaced() {
        let series = RegularSeries::new(
            "A",
            date(2024, 1, 1),
            Frequency::Weekly,
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        let dates = series.timestamps();
        for pair in dates.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 7);
        }
    }

    #[test]
    fn slice_keeps_calendar_alignment() {
        let series = RegularSeries::new(
            "A",
            date(2024, 1, 1),
            Frequency::Daily,
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
        )
        .unwrap();
        let tail = series.slice(2, 5).unwrap();
        assert_eq!(tail.start(), date(2024, 1, 3));
        assert_eq!(tail.demand(), &[3.0, 4.0, 5.0]);
        assert!(series.slice(3, 3).is_err());
        assert!(series.slice(0, 9).is_err());
    }

    #[test]
    fn zero_ratio_counts_zero_periods() {
        let series = RegularSeries::new(
            "A",
            date(2024, 1, 1),
            Frequency::Daily,
            vec![0.0, 2.0, 0.0, 0.0, 5.0],
        )
        .unwrap();
        assert_relative_eq!(series.zero_ratio(), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn exogenous_frame_enforces_alignment() {
        let mut frame = ExogenousFrame::new(3);
        frame.push_column("promo", vec![0.0, 1.0, 0.0]).unwrap();
        assert!(matches!(
            frame.push_column("holiday", vec![1.0]),
            Err(PlanningError::DimensionMismatch { expected: 3, got: 1 })
        ));
        assert_eq!(frame.n_columns(), 1);

        let sliced = frame.slice(1, 3).unwrap();
        assert_eq!(sliced.len(), 2);
        let (name, values) = sliced.columns().next().unwrap();
        assert_eq!(name, "promo");
        assert_eq!(values, &[1.0, 0.0]);
    }
}
