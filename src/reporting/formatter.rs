use chrono::{DateTime, Utc};
use crate::models::{Finding, Report, Severity};

pub fn format_finding_markdown(index: usize, finding: &Finding) -> String {
    let mut md = format!(
        "## {}. {}\n\n**Severity:** {}\n\n### Description\n{}\n\n### Impact\n{}\n\n",
        index + 1,
        finding.name,
        finding.severity,
        finding.description,
        finding.impact,
    );
    if let Some(point) = &finding.injection_point {
        md.push_str(&format!(
            "**Injection point:** `{}` ({}{})\n\n",
            point.parameter,
            point.kind,
            point.method.as_deref().map(|m| format!(", {}", m)).unwrap_or_default(),
        ));
    }
    if !finding.proof_of_concept.is_empty() {
        md.push_str(&format!("### Vulnerable Pattern / PoC\n```\n{}\n```\n\n", finding.proof_of_concept));
    }
    md.push_str(&format!("### Recommendation\n{}\n\n---\n\n", finding.recommendation));
    md
}

pub fn format_executive_summary(report: &Report) -> String {
    let counts = report.severity_counts();
    let mut md = String::from("## Executive Summary\n\n| Severity | Count |\n|---|---|\n");
    for severity in Severity::ALL {
        let count = counts.get(&severity).copied().unwrap_or(0);
        if severity == Severity::Unknown && count == 0 {
            continue;
        }
        md.push_str(&format!("| {} | {} |\n", severity, count));
    }
    md.push_str(&format!("| **Total** | **{}** |\n", report.total_findings()));
    md
}

pub fn format_report_markdown(report: &Report, generated_at: DateTime<Utc>) -> String {
    let mut md = String::from("# BugTrace-AI Security Report\n\n");
    md.push_str(&format!("**Target:** `{}`\n", report.target));
    md.push_str(&format!("**Date:** {}\n", generated_at.format("%Y-%m-%d %H:%M:%S UTC")));
    md.push_str(&format!("**Findings:** {}\n\n---\n\n", report.total_findings()));

    if report.is_empty() {
        md.push_str("## No Vulnerabilities Found\n\n");
        md.push_str("The analysis did not identify any vulnerabilities based on the selected scan type.\n");
        return md;
    }

    md.push_str(&format_executive_summary(report));
    md.push_str("\n---\n\n");
    for (i, finding) in report.findings.iter().enumerate() {
        md.push_str(&format_finding_markdown(i, finding));
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::models::InjectionPoint;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_empty_report() {
        let md = format_report_markdown(&Report::new("https://example.com"), date());
        assert!(md.contains("**Target:** `https://example.com`"));
        assert!(md.contains("**Date:** 2025-03-14 09:30:00 UTC"));
        assert!(md.contains("## No Vulnerabilities Found"));
    }

    #[test]
    fn test_findings_are_numbered_in_order() {
        let mut report = Report::new("t");
        let mut sqli = Finding::new("SQL Injection", Severity::Critical);
        sqli.proof_of_concept = "' OR 1=1--".into();
        sqli.injection_point = Some(InjectionPoint {
            kind: "URL_PARAM".into(),
            parameter: "id".into(),
            method: Some("GET".into()),
        });
        report.findings.push(sqli);
        report.findings.push(Finding::new("Missing HSTS", Severity::Low));

        let md = format_report_markdown(&report, date());
        let first = md.find("## 1. SQL Injection").unwrap();
        let second = md.find("## 2. Missing HSTS").unwrap();
        assert!(first < second);
        assert!(md.contains("**Injection point:** `id` (URL_PARAM, GET)"));
        assert!(md.contains("```\n' OR 1=1--\n```"));
        assert_eq!(md.matches("### Vulnerable Pattern / PoC").count(), 1);
    }

    #[test]
    fn test_executive_summary_counts() {
        let mut report = Report::new("t");
        report.findings.push(Finding::new("a", Severity::High));
        report.findings.push(Finding::new("b", Severity::High));
        report.findings.push(Finding::new("c", Severity::Info));
        let summary = format_executive_summary(&report);
        assert!(summary.contains("| High | 2 |"));
        assert!(summary.contains("| Critical | 0 |"));
        assert!(!summary.contains("Unknown"));
        assert!(summary.contains("| **Total** | **3** |"));
    }
}
