//! Series regularization: aligning raw observations to a fixed-step calendar.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::core::{DemandObservation, ExogenousFrame, Frequency, RegularSeries};
use crate::error::{PlanningError, Result};

/// Align one SKU's raw observations to a regular calendar.
///
/// The output covers `[min_date, max_date]` at the frequency's step with
/// missing periods filled with zero demand. Observations are expected
/// pre-aggregated (no duplicate timestamps); dates that fall between grid
/// points are summed into the period they belong to. A single observation
/// yields a valid length-1 series.
pub fn regularize(observations: &[DemandObservation], frequency: Frequency) -> Result<RegularSeries> {
    if observations.is_empty() {
        return Err(PlanningError::EmptyData);
    }
    let sku = observations[0].sku.as_str();
    if let Some(other) = observations.iter().find(|o| o.sku != sku) {
        return Err(PlanningError::InvalidParameter(format!(
            "mixed SKUs in one series: {sku} and {}",
            other.sku
        )));
    }
    if let Some(bad) = observations
        .iter()
        .find(|o| !o.quantity.is_finite() || o.quantity < 0.0)
    {
        return Err(PlanningError::InvalidParameter(format!(
            "demand for {} on {} must be finite and non-negative",
            bad.sku, bad.date
        )));
    }

    let mut seen: BTreeMap<NaiveDate, ()> = BTreeMap::new();
    for obs in observations {
        if seen.insert(obs.date, ()).is_some() {
            return Err(PlanningError::InvalidParameter(format!(
                "duplicate observation for {} on {}",
                obs.sku, obs.date
            )));
        }
    }

    let start = observations.iter().map(|o| o.date).min().unwrap_or_default();
    let end = observations.iter().map(|o| o.date).max().unwrap_or_default();
    let periods = frequency.periods_between(start, end) + 1;

    let mut demand = vec![0.0; periods];
    for obs in observations {
        let index = frequency.periods_between(start, obs.date);
        demand[index] += obs.quantity;
    }

    RegularSeries::new(sku, start, frequency, demand)
}

/// Align named exogenous columns to a series' date axis.
///
/// Each column is a sparse set of `(date, value)` readings. Values are
/// forward-filled along the axis, then back-filled for leading gaps, then
/// zero-filled when the column carried no readings at all.
pub fn regularize_exogenous(
    series: &RegularSeries,
    raw_columns: &[(String, Vec<(NaiveDate, f64)>)],
) -> Result<ExogenousFrame> {
    let frequency = series.frequency();
    let start = series.start();
    let end = series.last_date();
    let mut frame = ExogenousFrame::new(series.len());

    for (name, readings) in raw_columns {
        let mut sparse: Vec<Option<f64>> = vec![None; series.len()];
        for (date, value) in readings {
            if *date < start || *date > end || !value.is_finite() {
                continue;
            }
            let index = frequency.periods_between(start, *date);
            sparse[index] = Some(*value);
        }
        frame.push_column(name.clone(), fill_gaps(&sparse))?;
    }

    Ok(frame)
}

/// Forward-fill, then back-fill, then zero-fill.
fn fill_gaps(sparse: &[Option<f64>]) -> Vec<f64> {
    let mut filled: Vec<Option<f64>> = Vec::with_capacity(sparse.len());
    let mut last = None;
    for value in sparse {
        if value.is_some() {
            last = *value;
        }
        filled.push(last);
    }

    let mut next = None;
    for i in (0..filled.len()).rev() {
        if filled[i].is_some() {
            next = filled[i];
        } else {
            filled[i] = next;
        }
    }

    filled.into_iter().map(|v| v.unwrap_or(0.0)).collect()
}
