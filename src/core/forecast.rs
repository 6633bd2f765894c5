//! Forecast output structures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One forecast period with optional prediction-interval bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub forecast: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

/// Backend output before dates are attached: point predictions plus
/// optional interval bands of the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastBands {
    pub point: Vec<f64>,
    pub lower: Option<Vec<f64>>,
    pub upper: Option<Vec<f64>>,
}

impl ForecastBands {
    /// Point-only forecast.
    pub fn from_points(point: Vec<f64>) -> Self {
        Self {
            point,
            lower: None,
            upper: None,
        }
    }

    /// Forecast with symmetric-interval bands.
    pub fn with_intervals(point: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self {
            point,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn has_intervals(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }

    /// Attach calendar dates, producing the serializable point sequence.
    pub fn into_points(self, dates: &[NaiveDate]) -> Vec<ForecastPoint> {
        self.point
            .iter()
            .enumerate()
            .map(|(i, &forecast)| ForecastPoint {
                date: dates[i],
                forecast,
                lower_bound: self.lower.as_ref().map(|l| l[i]),
                upper_bound: self.upper.as_ref().map(|u| u[i]),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn bands_report_interval_presence() {
        let bands = ForecastBands::from_points(vec![1.0, 2.0]);
        assert_eq!(bands.horizon(), 2);
        assert!(!bands.has_intervals());

        let bands = ForecastBands::with_intervals(vec![2.0], vec![1.0], vec![3.0]);
        assert!(bands.has_intervals());
    }

    #[test]
    fn into_points_zips_dates_and_bounds() {
        let bands = ForecastBands::with_intervals(vec![2.0, 3.0], vec![1.0, 2.0], vec![3.0, 4.0]);
        let points = bands.into_points(&[date(1), date(2)]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].date, date(2));
        assert_eq!(points[1].forecast, 3.0);
        assert_eq!(points[1].lower_bound, Some(2.0));
        assert_eq!(points[1].upper_bound, Some(4.0));
    }

    #[test]
    fn forecast_point_serializes_iso_dates() {
        let point = ForecastPoint {
            date: date(5),
            forecast: 10.0,
            lower_bound: None,
            upper_bound: None,
        };
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("\"2024-01-05\""));
        assert!(!json.contains("lower_bound"));
    }
}
