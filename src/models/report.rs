use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use super::finding::{null_as_default, Finding, Severity};

/// A consolidated vulnerability report for one analyzed target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "analyzedTarget", alias = "target", default, deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(rename = "vulnerabilities", alias = "findings", default, deserialize_with = "null_as_default")]
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn new(target: &str) -> Self {
        Self {
            id: None,
            target: target.to_string(),
            findings: Vec::new(),
        }
    }

    /// Fill in the target when the model left it empty.
    pub fn with_fallback_target(mut self, target: &str) -> Self {
        if self.target.trim().is_empty() {
            self.target = target.to_string();
        }
        self
    }

    /// Returns a map of severity level to the count of findings at that severity.
    pub fn severity_counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for finding in &self.findings {
            *counts.entry(finding.severity).or_insert(0) += 1;
        }
        counts
    }

    pub fn total_findings(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_wire_names() {
        let report: Report = serde_json::from_value(json!({
            "analyzedTarget": "https://example.com",
            "vulnerabilities": [
                { "vulnerability": "XSS", "severity": "High" }
            ]
        }))
        .unwrap();
        assert_eq!(report.target, "https://example.com");
        assert_eq!(report.total_findings(), 1);
    }

    #[test]
    fn test_null_vulnerabilities_is_empty() {
        let report: Report = serde_json::from_value(json!({
            "analyzedTarget": "https://example.com",
            "vulnerabilities": null
        }))
        .unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_fallback_target_only_when_empty() {
        let report = Report::new("").with_fallback_target("https://a.test");
        assert_eq!(report.target, "https://a.test");

        let report = Report::new("https://b.test").with_fallback_target("https://a.test");
        assert_eq!(report.target, "https://b.test");
    }

    #[test]
    fn test_severity_counts() {
        let mut report = Report::new("t");
        report.findings.push(Finding::new("a", Severity::High));
        report.findings.push(Finding::new("b", Severity::High));
        report.findings.push(Finding::new("c", Severity::Unknown));
        let counts = report.severity_counts();
        assert_eq!(counts.get(&Severity::High), Some(&2));
        assert_eq!(counts.get(&Severity::Unknown), Some(&1));
        assert_eq!(counts.get(&Severity::Critical), None);
    }
}
