use serde::{Deserialize, Serialize};

/// The validator's judgement on a single finding. Consumed immediately by the
/// pipeline and never stored on the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    #[serde(alias = "isValid")]
    pub is_valid: bool,
    #[serde(default)]
    pub reasoning: String,
}

impl ValidationVerdict {
    /// A finding is dropped only on an explicit negative verdict.
    pub fn rejects(&self) -> bool {
        !self.is_valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_and_camel_case_accepted() {
        let v: ValidationVerdict =
            serde_json::from_str(r#"{"is_valid": false, "reasoning": "patched in 2.3"}"#).unwrap();
        assert!(v.rejects());
        let v: ValidationVerdict = serde_json::from_str(r#"{"isValid": true}"#).unwrap();
        assert!(!v.rejects());
        assert_eq!(v.reasoning, "");
    }

    #[test]
    fn test_missing_is_valid_is_an_error() {
        assert!(serde_json::from_str::<ValidationVerdict>(r#"{"reasoning": "?"}"#).is_err());
    }
}
