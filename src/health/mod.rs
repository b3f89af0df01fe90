//! Derived health indicators: range position, organ highlighting and the
//! aggregate score, plus the dashboard view that combines them.

pub mod dashboard;
pub mod organs;
pub mod range;
pub mod score;

pub use dashboard::{DashboardView, KEY_METRICS};
pub use organs::{collect_affected_tags, resolve as resolve_organs, OrganCatalogEntry, ORGAN_CATALOG};
pub use range::{default_range_for, map_to_percentage, DisplayRange, RangePosition, Severity};
pub use score::health_score;
