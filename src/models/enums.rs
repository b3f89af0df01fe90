use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Parsing ignores ASCII case and surrounding whitespace; serde goes
/// through the same pair so JSON from the analysis service is accepted
/// in any casing and written back canonically.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($s) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(DatabaseError::InvalidEnum {
                    field: stringify!($name).into(),
                    value: s.into(),
                })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(MetricStatus {
    Normal => "Normal",
    Low => "Low",
    High => "High",
    Critical => "Critical",
});

str_enum!(ChatRole {
    User => "user",
    Ai => "ai",
});

impl MetricStatus {
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn metric_status_round_trip() {
        for status in [
            MetricStatus::Normal,
            MetricStatus::Low,
            MetricStatus::High,
            MetricStatus::Critical,
        ] {
            assert_eq!(MetricStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn metric_status_ignores_case() {
        assert_eq!(MetricStatus::from_str("high").unwrap(), MetricStatus::High);
        assert_eq!(MetricStatus::from_str(" CRITICAL ").unwrap(), MetricStatus::Critical);
    }

    #[test]
    fn invalid_enum_returns_error() {
        let err = MetricStatus::from_str("Borderline").unwrap_err();
        assert!(err.to_string().contains("MetricStatus"));
    }

    #[test]
    fn serde_uses_canonical_names() {
        let status: MetricStatus = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(status, MetricStatus::Low);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Low\"");
        assert_eq!(serde_json::to_string(&ChatRole::Ai).unwrap(), "\"ai\"");
    }
}
