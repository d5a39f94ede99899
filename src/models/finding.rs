use serde::{Deserialize, Deserializer, Serialize};

/// Severity level for a security finding, ordered from most to least severe.
///
/// The set is closed: anything the model sends that is not one of the first
/// five levels is coerced to `Unknown` at ingestion and never rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
    #[default]
    Unknown,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
        Severity::Unknown,
    ];

    /// Map a free-form severity label onto the closed set.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            "info" => Severity::Info,
            _ => Severity::Unknown,
        }
    }

    /// Returns a numeric rank where lower values indicate higher severity.
    /// Critical = 0 through Unknown = 5.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
            Severity::Info => 4,
            Severity::Unknown => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Info => "Info",
            Severity::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::String(s) => Severity::normalize(&s),
            _ => Severity::Unknown,
        })
    }
}

/// Where an injection-class finding takes its input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionPoint {
    /// URL_PARAM, POST_PARAM or PATH in practice; kept open.
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// A single security finding reported by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "vulnerability", alias = "name", default = "default_name", deserialize_with = "name_or_default")]
    pub name: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub impact: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendation: String,
    /// The vulnerable pattern or a proof-of-concept payload.
    #[serde(
        rename = "vulnerableCode",
        alias = "proofOfConcept",
        alias = "proof_of_concept",
        default,
        deserialize_with = "null_as_default"
    )]
    pub proof_of_concept: String,
    #[serde(rename = "injectionPoint", alias = "injection_point", default, skip_serializing_if = "Option::is_none")]
    pub injection_point: Option<InjectionPoint>,
}

impl Finding {
    pub fn new(name: &str, severity: Severity) -> Self {
        Self {
            name: name.to_string(),
            severity,
            description: String::new(),
            impact: String::new(),
            recommendation: String::new(),
            proof_of_concept: String::new(),
            injection_point: None,
        }
    }

    /// Fold an enriched copy returned by deep analysis over this finding.
    ///
    /// The enriched copy wins on descriptive fields; identity fields the model
    /// dropped are carried over from the original.
    pub fn merge_enriched(&self, mut enriched: Finding) -> Finding {
        if enriched.name.trim().is_empty() || enriched.name == default_name() {
            enriched.name = self.name.clone();
        }
        if enriched.injection_point.is_none() {
            enriched.injection_point = self.injection_point.clone();
        }
        for (field, original) in [
            (&mut enriched.description, &self.description),
            (&mut enriched.impact, &self.impact),
            (&mut enriched.recommendation, &self.recommendation),
            (&mut enriched.proof_of_concept, &self.proof_of_concept),
        ] {
            if field.trim().is_empty() {
                *field = original.clone();
            }
        }
        enriched
    }
}

fn default_name() -> String {
    "Unnamed finding".to_string()
}

fn name_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(name.filter(|n| !n.trim().is_empty()).unwrap_or_else(default_name))
}

/// Treat an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
