use serde::{Deserialize, Deserializer, Serialize};

use super::enums::MetricStatus;

/// Accept `null` wherever a defaultable value is expected. The analysis
/// service emits `null` for empty insight lists on normal results.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A measured value as reported: either a number or free text such as
/// `"5.4"` or `"120/80"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    /// Numeric coercion. Text is parsed from its leading numeric prefix,
    /// so `"120/80"` yields 120. Non-numeric and non-finite values yield None.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            Self::Text(s) => parse_leading_number(s),
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

fn parse_leading_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return None;
    }
    s[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Per-metric interpretation supplied by the analysis service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricInsights {
    #[serde(default, deserialize_with = "null_as_default")]
    pub possible_causes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommended_actions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dietary_suggestions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub affected_organs: Vec<String>,
}

impl MetricInsights {
    pub fn is_empty(&self) -> bool {
        self.possible_causes.is_empty()
            && self.recommended_actions.is_empty()
            && self.dietary_suggestions.is_empty()
            && self.affected_organs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: MetricValue,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: String,
    pub status: MetricStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<MetricInsights>,
}

impl Metric {
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_f64()
    }

    /// Insight lists, empty when the service sent none.
    pub fn insights_or_default(&self) -> MetricInsights {
        self.insights.clone().unwrap_or_default()
    }
}

/// Structured result of analyzing one report file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Vec<Metric>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overall_summary: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub critical_findings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_is_coerced() {
        assert_eq!(MetricValue::Text("5.4".into()).as_f64(), Some(5.4));
        assert_eq!(MetricValue::Text(" 5.4 ".into()).as_f64(), Some(5.4));
        assert_eq!(MetricValue::Text("120/80".into()).as_f64(), Some(120.0));
        assert_eq!(MetricValue::Text("-3 mg".into()).as_f64(), Some(-3.0));
        assert_eq!(MetricValue::Text("7.".into()).as_f64(), Some(7.0));
    }

    #[test]
    fn non_numeric_text_is_absent() {
        assert_eq!(MetricValue::Text("Positive".into()).as_f64(), None);
        assert_eq!(MetricValue::Text("".into()).as_f64(), None);
        assert_eq!(MetricValue::Text("-".into()).as_f64(), None);
        assert_eq!(MetricValue::Number(f64::NAN).as_f64(), None);
    }

    #[test]
    fn metric_parses_service_payload() {
        let json = r#"{
            "name": "Hemoglobin",
            "value": "10.2",
            "unit": "g/dL",
            "reference_range": "13.5-17.5",
            "status": "low",
            "confidence_score": 0.92,
            "insights": {
                "possible_causes": ["Iron deficiency"],
                "recommended_actions": null,
                "affected_organs": ["Blood", "Bone marrow"]
            }
        }"#;
        let metric: Metric = serde_json::from_str(json).unwrap();
        assert_eq!(metric.status, MetricStatus::Low);
        assert_eq!(metric.numeric_value(), Some(10.2));
        let insights = metric.insights_or_default();
        assert!(insights.recommended_actions.is_empty());
        assert!(insights.dietary_suggestions.is_empty());
        assert_eq!(insights.affected_organs.len(), 2);
    }

    #[test]
    fn null_insights_default_to_empty() {
        let json = r#"{"name": "Glucose", "value": 90, "unit": null, "status": "Normal", "insights": null}"#;
        let metric: Metric = serde_json::from_str(json).unwrap();
        assert!(metric.insights.is_none());
        assert!(metric.insights_or_default().is_empty());
        assert_eq!(metric.unit, "");
    }

    #[test]
    fn analysis_result_tolerates_missing_fields() {
        let result: AnalysisResult = serde_json::from_str(r#"{"metrics": []}"#).unwrap();
        assert!(result.metrics.is_empty());
        assert_eq!(result.overall_summary, "");
        assert!(result.patient_name.is_none());
    }

    #[test]
    fn unknown_status_rejected() {
        let json = r#"{"name": "X", "value": 1, "unit": "", "status": "Borderline"}"#;
        assert!(serde_json::from_str::<Metric>(json).is_err());
    }
}
