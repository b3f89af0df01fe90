use serde::{de, Deserialize, Deserializer, Serialize};

use super::enums::ChatRole;
use super::metric::null_as_default;

/// Accept `"10"`, `10` or `null` for free-text count fields.
fn deserialize_flexible_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlexibleText;

    impl<'de> de::Visitor<'de> for FlexibleText {
        type Value = String;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(FlexibleText)
}

/// Accept counts as numbers or numeric strings; anything else is absent.
fn deserialize_flexible_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_flexible_text")]
    pub reps: String,
    #[serde(default, deserialize_with = "deserialize_flexible_count", skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_flexible_count", skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// One day of a weekly rehabilitation plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub focus: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub exercises: Vec<PlannedExercise>,
}

/// Reply of the consultation service. `weekly_plan` is absent when the
/// service could not produce a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsultResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub diagnosis_note: String,
    #[serde(default)]
    pub weekly_plan: Option<Vec<DayPlan>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recovery_tips: Vec<String>,
}

/// Message kind tag; only plan messages carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    WeeklyPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Vec<DayPlan>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recovery_tips: Vec<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            kind: None,
            content: content.into(),
            plan: None,
            recovery_tips: Vec::new(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Ai,
            ..Self::user(content)
        }
    }

    pub fn weekly_plan(note: impl Into<String>, plan: Vec<DayPlan>, recovery_tips: Vec<String>) -> Self {
        Self {
            role: ChatRole::Ai,
            kind: Some(MessageKind::WeeklyPlan),
            content: note.into(),
            plan: Some(plan),
            recovery_tips,
        }
    }
}
