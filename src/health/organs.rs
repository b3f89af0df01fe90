//! Maps free-text organ tags from metric insights onto the body-map catalog.

use serde::Serialize;

use crate::models::Metric;

/// One highlightable region of the body map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrganCatalogEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub keywords: &'static [&'static str],
}

pub const ORGAN_CATALOG: &[OrganCatalogEntry] = &[
    OrganCatalogEntry {
        id: "thyroid",
        label: "Thyroid",
        keywords: &["thyroid", "throat", "neck", "hormone", "tsh"],
    },
    OrganCatalogEntry {
        id: "trachea",
        label: "Trachea",
        keywords: &["trachea", "windpipe", "throat"],
    },
    OrganCatalogEntry {
        id: "lungs",
        label: "Lungs",
        keywords: &["lung", "respiratory", "breath", "chest", "pneumonia"],
    },
    OrganCatalogEntry {
        id: "heart",
        label: "Heart",
        keywords: &["heart", "cardiac", "pulse", "bp", "pressure"],
    },
    OrganCatalogEntry {
        id: "liver",
        label: "Liver",
        keywords: &["liver", "hepatic", "sgpt", "sgot"],
    },
    OrganCatalogEntry {
        id: "stomach",
        label: "Stomach",
        keywords: &["stomach", "gut", "gastric"],
    },
    OrganCatalogEntry {
        id: "pancreas",
        label: "Pancreas",
        keywords: &["pancreas", "insulin", "diabetes", "sugar"],
    },
    OrganCatalogEntry {
        id: "kidneys",
        label: "Kidney",
        keywords: &["kidney", "renal", "creatinine"],
    },
    OrganCatalogEntry {
        id: "large_intestine",
        label: "Large Intestine",
        keywords: &["colon", "bowel", "intestine"],
    },
    OrganCatalogEntry {
        id: "small_intestine",
        label: "Small Intestine",
        keywords: &["intestine", "gut"],
    },
    OrganCatalogEntry {
        id: "bladder",
        label: "Bladder",
        keywords: &["bladder", "urine", "urinary"],
    },
];

/// Catalog entries touched by any tag, in catalog order, each at most once.
/// A tag matches an entry when one of the entry's keywords occurs anywhere
/// in the lower-cased tag ("Kidneys" matches "kidney").
pub fn resolve(tags: &[String]) -> Vec<&'static OrganCatalogEntry> {
    let lowered = normalize_tags(tags);
    if lowered.is_empty() {
        return Vec::new();
    }

    ORGAN_CATALOG
        .iter()
        .filter(|entry| {
            entry
                .keywords
                .iter()
                .any(|kw| lowered.iter().any(|tag| tag.contains(*kw)))
        })
        .collect()
}

/// Whether a single catalog entry is highlighted for these tags.
pub fn is_affected(entry_id: &str, tags: &[String]) -> bool {
    resolve(tags).iter().any(|entry| entry.id == entry_id)
}

/// Flatten `affected_organs` across metrics, dropping blanks and repeats
/// (first occurrence wins).
pub fn collect_affected_tags(metrics: &[Metric]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for metric in metrics {
        let Some(insights) = &metric.insights else {
            continue;
        };
        for organ in &insights.affected_organs {
            let organ = organ.trim();
            if !organ.is_empty() && !tags.iter().any(|t| t == organ) {
                tags.push(organ.to_string());
            }
        }
    }
    tags
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let lower = tag.trim().to_lowercase();
        if !lower.is_empty() && !out.contains(&lower) {
            out.push(lower);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricInsights, MetricStatus, MetricValue};

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn ids(entries: &[&OrganCatalogEntry]) -> Vec<&'static str> {
        entries.iter().map(|e| e.id).collect()
    }

    #[test]
    fn thyroid_hormone_matches_thyroid_only() {
        let matched = resolve(&tags(&["Thyroid hormone"]));
        assert_eq!(ids(&matched), vec!["thyroid"]);
    }

    #[test]
    fn empty_tags_match_nothing() {
        assert!(resolve(&[]).is_empty());
        assert!(resolve(&tags(&["  "])).is_empty());
    }

    #[test]
    fn throat_matches_two_regions_in_catalog_order() {
        let matched = resolve(&tags(&["Throat"]));
        assert_eq!(ids(&matched), vec!["thyroid", "trachea"]);
    }

    #[test]
    fn plural_and_case_insensitive() {
        let matched = resolve(&tags(&["KIDNEYS", "Liver"]));
        assert_eq!(ids(&matched), vec!["liver", "kidneys"]);
    }

    #[test]
    fn each_entry_at_most_once() {
        let matched = resolve(&tags(&["gut", "gut health", "intestine"]));
        assert_eq!(ids(&matched), vec!["stomach", "large_intestine", "small_intestine"]);
    }

    #[test]
    fn unmatched_tags_ignored() {
        let matched = resolve(&tags(&["Bone marrow", "Heart"]));
        assert_eq!(ids(&matched), vec!["heart"]);
        assert!(is_affected("heart", &tags(&["cardiac muscle"])));
        assert!(!is_affected("bladder", &tags(&["cardiac muscle"])));
    }

    #[test]
    fn catalog_has_eleven_regions() {
        assert_eq!(ORGAN_CATALOG.len(), 11);
    }

    #[test]
    fn collects_unique_tags_across_metrics() {
        let metric = |organs: &[&str]| Metric {
            name: "X".into(),
            value: MetricValue::Number(1.0),
            unit: String::new(),
            status: MetricStatus::High,
            reference_range: None,
            confidence_score: None,
            insights: Some(MetricInsights {
                affected_organs: tags(organs),
                ..Default::default()
            }),
        };
        let mut no_insights = metric(&[]);
        no_insights.insights = None;

        let metrics = vec![metric(&["Liver", "Heart"]), no_insights, metric(&["Heart", " ", "Kidneys"])];
        assert_eq!(collect_affected_tags(&metrics), tags(&["Liver", "Heart", "Kidneys"]));
    }
}
