//! Position of a value inside a reference range, as a 0–100 percentage for
//! range bars, plus the severity band used to colour it.

use serde::{Deserialize, Serialize};

use crate::models::MetricStatus;

/// Colour band of a range indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Caution,
    Alert,
}

impl Severity {
    pub fn from_status(status: MetricStatus) -> Self {
        match status {
            MetricStatus::Normal => Self::Normal,
            MetricStatus::Low => Self::Caution,
            MetricStatus::High | MetricStatus::Critical => Self::Alert,
        }
    }
}

/// Display bounds for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub min: f64,
    pub max: f64,
}

/// Display bounds keyed off the metric name. Matching is case-sensitive on
/// purpose: names come from the service capitalised ("Blood Sugar").
pub fn default_range_for(name: &str) -> DisplayRange {
    let max = if name.contains("Sugar") {
        200.0
    } else if name.contains("Pressure") {
        180.0
    } else {
        20.0
    };
    DisplayRange { min: 0.0, max }
}

/// Map `value` onto [0, 100] relative to `[min, max]`, clamping outside the
/// range. A degenerate range (or NaN input) maps to the midpoint.
pub fn map_to_percentage(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span == 0.0 || !span.is_finite() || value.is_nan() {
        return 50.0;
    }
    let pct = ((value - min) / span) * 100.0;
    if pct.is_nan() {
        return 50.0;
    }
    pct.clamp(0.0, 100.0)
}

/// Everything a range bar needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangePosition {
    pub value: f64,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub percentage: f64,
    pub severity: Severity,
}

impl RangePosition {
    pub fn new(value: f64, unit: &str, range: DisplayRange, status: MetricStatus) -> Self {
        Self {
            value,
            unit: unit.to_string(),
            min: range.min,
            max: range.max,
            percentage: map_to_percentage(value, range.min, range.max),
            severity: Severity::from_status(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_inside_range() {
        assert_eq!(map_to_percentage(10.0, 0.0, 20.0), 50.0);
        assert_eq!(map_to_percentage(0.0, 0.0, 20.0), 0.0);
        assert_eq!(map_to_percentage(20.0, 0.0, 20.0), 100.0);
        assert_eq!(map_to_percentage(150.0, 0.0, 200.0), 75.0);
    }

    #[test]
    fn clamps_outside_range() {
        assert_eq!(map_to_percentage(-5.0, 0.0, 20.0), 0.0);
        assert_eq!(map_to_percentage(25.0, 0.0, 20.0), 100.0);
        assert_eq!(map_to_percentage(f64::INFINITY, 0.0, 20.0), 100.0);
    }

    #[test]
    fn degenerate_range_is_midpoint() {
        assert_eq!(map_to_percentage(3.0, 5.0, 5.0), 50.0);
        assert_eq!(map_to_percentage(f64::NAN, 0.0, 20.0), 50.0);
    }

    #[test]
    fn monotonic_in_value() {
        let mut last = -1.0;
        for i in -10..=30 {
            let pct = map_to_percentage(i as f64, 0.0, 20.0);
            assert!(pct >= last, "not monotonic at {i}");
            assert!((0.0..=100.0).contains(&pct));
            last = pct;
        }
    }

    #[test]
    fn severity_bands() {
        assert_eq!(Severity::from_status(MetricStatus::Normal), Severity::Normal);
        assert_eq!(Severity::from_status(MetricStatus::Low), Severity::Caution);
        assert_eq!(Severity::from_status(MetricStatus::High), Severity::Alert);
        assert_eq!(Severity::from_status(MetricStatus::Critical), Severity::Alert);
    }

    #[test]
    fn default_ranges_by_name() {
        assert_eq!(default_range_for("Blood Sugar").max, 200.0);
        assert_eq!(default_range_for("Blood Pressure").max, 180.0);
        assert_eq!(default_range_for("Hemoglobin").max, 20.0);
        assert_eq!(default_range_for("Hemoglobin").min, 0.0);
    }

    #[test]
    fn position_combines_mapping_and_severity() {
        let pos = RangePosition::new(15.0, "g/dL", default_range_for("Hemoglobin"), MetricStatus::High);
        assert_eq!(pos.percentage, 75.0);
        assert_eq!(pos.severity, Severity::Alert);
        assert_eq!(pos.unit, "g/dL");
    }
}
