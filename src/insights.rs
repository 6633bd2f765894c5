//! Rule-based planning insights.

use serde::{Deserialize, Serialize};

use crate::core::{ForecastPoint, RegularSeries};
use crate::inventory::SimulationResult;

/// Demand jump, relative to recent history, that triggers an increase flag.
const DEMAND_INCREASE_FACTOR: f64 = 1.1;
const COMPARISON_WINDOW: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// One human-readable planning flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Insight {
    fn new(kind: &str, message: String, severity: Severity) -> Self {
        Self {
            kind: kind.to_string(),
            message,
            severity,
            value: None,
        }
    }

    fn with_value(mut self, value: f64) -> Self {
        self.value = Some((value * 100.0).round() / 100.0);
        self
    }
}

/// Derive insights in their fixed order.
///
/// Each rule fires independently; the inventory-assumption flag, when
/// present, always leads the list so consumers see the caveat before the
/// numbers built on it.
pub fn derive_insights(
    series: &RegularSeries,
    points: &[ForecastPoint],
    inventory_estimated: bool,
    simulation: &SimulationResult,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    let demand = series.demand();
    let recent_window = COMPARISON_WINDOW.min(demand.len());
    let upcoming_window = COMPARISON_WINDOW.min(points.len());
    if recent_window > 0 && upcoming_window > 0 {
        let recent_mean = demand[demand.len() - recent_window..]
            .iter()
            .sum::<f64>()
            / recent_window as f64;
        let upcoming_mean = points[..upcoming_window]
            .iter()
            .map(|p| p.forecast)
            .sum::<f64>()
            / upcoming_window as f64;
        if upcoming_mean > DEMAND_INCREASE_FACTOR * recent_mean {
            // A zero recent mean still fires; only the percent needs a guard.
            let pct_change = if recent_mean > 0.0 {
                (upcoming_mean / recent_mean - 1.0) * 100.0
            } else {
                0.0
            };
            insights.push(
                Insight::new(
                    "demand_increase",
                    "Demand is projected to rise in the next week.".to_string(),
                    Severity::Info,
                )
                .with_value(pct_change),
            );
        }
    }

    if let Some(date) = simulation.reorder_date {
        insights.push(Insight::new(
            "reorder_point",
            format!("Place next order by {date}."),
            Severity::Warning,
        ));
    }

    if let Some(date) = simulation.stockout_date {
        insights.push(Insight::new(
            "stockout_risk",
            format!("Projected stockout on {date}."),
            Severity::Critical,
        ));
    }

    if let Some(qty) = simulation.recommended_order_qty {
        if qty > 0.0 {
            insights.push(
                Insight::new(
                    "recommended_order",
                    "Suggested order quantity derived from forecast and policy.".to_string(),
                    Severity::Info,
                )
                .with_value(qty),
            );
        }
    }

    if inventory_estimated {
        insights.insert(
            0,
            Insight::new(
                "inventory_assumption",
                "Starting inventory was estimated from recent demand, not a measured stock level."
                    .to_string(),
                Severity::Warning,
            ),
        );
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Frequency;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_series(values: &[f64]) -> RegularSeries {
        RegularSeries::new("SKU-1", date(2024, 1, 1), Frequency::Daily, values.to_vec()).unwrap()
    }

    fn flat_points(demand: f64, n: usize) -> Vec<ForecastPoint> {
        (0..n)
            .map(|i| ForecastPoint {
                date: date(2024, 2, 1) + chrono::Duration::days(i as i64),
                forecast: demand,
                lower_bound: None,
                upper_bound: None,
            })
            .collect()
    }

    #[test]
    fn rising_forecast_emits_demand_increase() {
        let series = make_series(&[10.0; 14]);
        let points = flat_points(15.0, 7);
        let insights = derive_insights(&series, &points, false, &SimulationResult::default());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, "demand_increase");
        assert_eq!(insights[0].severity, Severity::Info);
        assert_eq!(insights[0].value, Some(50.0));
    }

    #[test]
    fn dormant_history_with_positive_forecast_flags_an_increase() {
        let mut values = vec![9.0; 14];
        for v in values.iter_mut().skip(7) {
            *v = 0.0;
        }
        let series = make_series(&values);
        let points = flat_points(4.0, 7);
        let insights = derive_insights(&series, &points, false, &SimulationResult::default());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, "demand_increase");
        assert_eq!(insights[0].value, Some(0.0));
    }

    #[test]
    fn flat_forecast_emits_nothing() {
        let series = make_series(&[10.0; 14]);
        let points = flat_points(10.0, 7);
        let insights = derive_insights(&series, &points, false, &SimulationResult::default());
        assert!(insights.is_empty());
    }

    #[test]
    fn inventory_assumption_always_leads() {
        let series = make_series(&[10.0; 14]);
        let points = flat_points(20.0, 7);
        let simulation = SimulationResult {
            reorder_date: Some(date(2024, 2, 3)),
            stockout_date: Some(date(2024, 2, 6)),
            recommended_order_qty: Some(40.0),
        };
        let insights = derive_insights(&series, &points, true, &simulation);
        assert_eq!(insights[0].kind, "inventory_assumption");
        assert_eq!(insights[0].severity, Severity::Warning);
        let kinds: Vec<&str> = insights.iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "inventory_assumption",
                "demand_increase",
                "reorder_point",
                "stockout_risk",
                "recommended_order"
            ]
        );
    }

    #[test]
    fn dates_render_iso_in_messages() {
        let series = make_series(&[10.0; 14]);
        let simulation = SimulationResult {
            reorder_date: Some(date(2024, 2, 3)),
            stockout_date: None,
            recommended_order_qty: None,
        };
        let insights = derive_insights(&series, &flat_points(10.0, 7), false, &simulation);
        assert_eq!(insights[0].message, "Place next order by 2024-02-03.");
    }

    #[test]
    fn zero_order_quantity_is_not_reported() {
        let series = make_series(&[10.0; 14]);
        let simulation = SimulationResult {
            reorder_date: Some(date(2024, 2, 3)),
            stockout_date: None,
            recommended_order_qty: Some(0.0),
        };
        let insights = derive_insights(&series, &flat_points(10.0, 7), false, &simulation);
        assert!(insights.iter().all(|i| i.kind != "recommended_order"));
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }
}
