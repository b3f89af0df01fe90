use crate::models::Metric;

pub const MAX_SCORE: u32 = 100;
pub const PENALTY_PER_ABNORMAL: u32 = 10;

/// Aggregate score of one document: 100 minus 10 for every metric outside
/// the normal band, never below 0.
pub fn health_score(metrics: &[Metric]) -> u32 {
    let abnormal = metrics.iter().filter(|m| !m.status.is_normal()).count();
    let penalty = u32::try_from(abnormal)
        .unwrap_or(u32::MAX)
        .saturating_mul(PENALTY_PER_ABNORMAL);
    MAX_SCORE.saturating_sub(penalty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricStatus, MetricValue};

    fn metrics(statuses: &[MetricStatus]) -> Vec<Metric> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| Metric {
                name: format!("m{i}"),
                value: MetricValue::Number(1.0),
                unit: String::new(),
                status: *status,
                reference_range: None,
                confidence_score: None,
                insights: None,
            })
            .collect()
    }

    #[test]
    fn empty_document_scores_full() {
        assert_eq!(health_score(&[]), 100);
    }

    #[test]
    fn each_abnormal_costs_ten() {
        use MetricStatus::*;
        assert_eq!(health_score(&metrics(&[Normal, High, Low, Normal])), 80);
        assert_eq!(health_score(&metrics(&[Critical])), 90);
    }

    #[test]
    fn all_normal_scores_full() {
        assert_eq!(health_score(&metrics(&[MetricStatus::Normal; 25])), 100);
    }

    #[test]
    fn floors_at_zero() {
        assert_eq!(health_score(&metrics(&[MetricStatus::High; 10])), 0);
        assert_eq!(health_score(&metrics(&[MetricStatus::Critical; 15])), 0);
    }
}
