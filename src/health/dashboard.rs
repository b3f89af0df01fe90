//! Dashboard derivation for the active document.
//!
//! Everything here is a pure function of one [`AnalysisResult`]; nothing is
//! cached, so the view is rebuilt whenever the active document changes.

use serde::Serialize;

use super::organs::{collect_affected_tags, resolve, OrganCatalogEntry};
use super::range::{default_range_for, RangePosition, Severity};
use super::score::{health_score, MAX_SCORE};
use crate::models::{AnalysisResult, Metric, MetricInsights, MetricStatus};

/// Headline metrics shown as range-bar cards, in display order.
pub const KEY_METRICS: [&str; 3] = ["Blood Pressure", "Hemoglobin", "Blood Sugar"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetricCard {
    pub title: &'static str,
    /// None when the document has no metric to show in this slot.
    pub metric_name: Option<String>,
    pub status: Option<MetricStatus>,
    pub range: Option<RangePosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
    pub status: MetricStatus,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightCard {
    pub name: String,
    pub display_value: String,
    pub status: MetricStatus,
    pub severity: Severity,
    /// Abnormal results expand to show their insight lists.
    pub expandable: bool,
    pub insights: MetricInsights,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Full marks until a report is loaded.
    pub score: u32,
    pub has_report: bool,
    pub key_metrics: Vec<KeyMetricCard>,
    pub chart: Vec<ChartPoint>,
    pub affected_organs: Vec<&'static OrganCatalogEntry>,
    pub summary: Option<String>,
    pub insight_cards: Vec<InsightCard>,
}

impl DashboardView {
    pub fn build(active: Option<&AnalysisResult>) -> Self {
        let Some(result) = active else {
            return Self::empty();
        };
        let metrics = &result.metrics;
        let tags = collect_affected_tags(metrics);

        Self {
            score: health_score(metrics),
            has_report: true,
            key_metrics: KEY_METRICS
                .into_iter()
                .enumerate()
                .map(|(i, title)| key_metric_card(title, i, metrics))
                .collect(),
            chart: chart_points(metrics),
            affected_organs: resolve(&tags),
            summary: Some(result.overall_summary.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            insight_cards: metrics.iter().map(insight_card).collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            score: MAX_SCORE,
            has_report: false,
            key_metrics: KEY_METRICS
                .into_iter()
                .map(|title| KeyMetricCard {
                    title,
                    metric_name: None,
                    status: None,
                    range: None,
                })
                .collect(),
            chart: Vec::new(),
            affected_organs: Vec::new(),
            summary: None,
            insight_cards: Vec::new(),
        }
    }
}

/// First metric whose name contains the card title (ignoring case), else
/// the metric sitting at the card's position.
fn key_metric_card(title: &'static str, index: usize, metrics: &[Metric]) -> KeyMetricCard {
    let needle = title.to_lowercase();
    let found = metrics
        .iter()
        .find(|m| m.name.to_lowercase().contains(&needle))
        .or_else(|| metrics.get(index));

    match found {
        Some(metric) => KeyMetricCard {
            title,
            metric_name: Some(metric.name.clone()),
            status: Some(metric.status),
            // Range bars always render; a non-numeric reading sits at the floor.
            range: Some(RangePosition::new(
                metric.numeric_value().unwrap_or(0.0),
                &metric.unit,
                default_range_for(&metric.name),
                metric.status,
            )),
        },
        None => KeyMetricCard {
            title,
            metric_name: None,
            status: None,
            range: None,
        },
    }
}

fn chart_points(metrics: &[Metric]) -> Vec<ChartPoint> {
    metrics
        .iter()
        .filter_map(|m| {
            m.numeric_value().map(|value| ChartPoint {
                name: m.name.clone(),
                value,
                status: m.status,
                unit: m.unit.clone(),
            })
        })
        .collect()
}

fn insight_card(metric: &Metric) -> InsightCard {
    InsightCard {
        name: metric.name.clone(),
        display_value: metric.value.to_string(),
        status: metric.status,
        severity: Severity::from_status(metric.status),
        expandable: !metric.status.is_normal(),
        insights: metric.insights_or_default(),
    }
}
