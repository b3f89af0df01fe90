use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::metric::AnalysisResult;

/// Identifier of a stored document.
///
/// Locally created records carry a text id built from the submission time
/// and queue position; rows from the remote store carry a server-assigned
/// number. Both shapes are accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentId {
    Number(i64),
    Text(String),
}

impl DocumentId {
    /// Id for the record produced from queue position `index` of a batch
    /// submitted at `submitted_ms`.
    pub fn for_batch_item(submitted_ms: i64, index: usize) -> Self {
        Self::Text(format!("{submitted_ms}-{index}"))
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_i64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlexibleId;

        impl<'de> de::Visitor<'de> for FlexibleId {
            type Value = DocumentId;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("an integer or string document id")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<DocumentId, E> {
                Ok(DocumentId::Number(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<DocumentId, E> {
                i64::try_from(v)
                    .map(DocumentId::Number)
                    .map_err(|_| E::custom(format!("document id {v} out of range")))
            }

            // Millisecond ids written as JS numbers can come back as floats.
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<DocumentId, E> {
                if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                    Ok(DocumentId::Number(v as i64))
                } else {
                    Ok(DocumentId::Text(v.to_string()))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<DocumentId, E> {
                Ok(DocumentId::Text(v.to_string()))
            }
        }

        deserializer.deserialize_any(FlexibleId)
    }
}

/// One analyzed report in a user's history. The analysis fields sit at the
/// top level of the JSON object next to the record metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub name: String,
    pub date: String,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
}

impl DocumentRecord {
    pub fn new(id: DocumentId, name: impl Into<String>, date: impl Into<String>, analysis: AnalysisResult) -> Self {
        Self {
            id,
            name: name.into(),
            date: date.into(),
            analysis,
        }
    }
}

/// Contents of the dashboard slot.
///
/// A document loaded from the history keeps its id, name and date; a quick
/// analysis that never entered the history has none. Either way the JSON is
/// readable as a bare analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
}

impl ActiveDocument {
    /// The history entry this slot was loaded from, if any.
    pub fn record(&self) -> Option<DocumentRecord> {
        let (id, name, date) = (self.id.clone()?, self.name.clone()?, self.date.clone()?);
        Some(DocumentRecord::new(id, name, date, self.analysis.clone()))
    }

    pub fn is_from_history(&self) -> bool {
        self.id.is_some()
    }
}

impl From<&DocumentRecord> for ActiveDocument {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            name: Some(record.name.clone()),
            date: Some(record.date.clone()),
            analysis: record.analysis.clone(),
        }
    }
}

impl From<AnalysisResult> for ActiveDocument {
    fn from(analysis: AnalysisResult) -> Self {
        Self {
            id: None,
            name: None,
            date: None,
            analysis,
        }
    }
}
