use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::BugtraceError;
use crate::models::Report;
use super::formatter::format_report_markdown;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = BugtraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(BugtraceError::Config(format!(
                "Unknown output format '{}'. Expected markdown or json",
                other
            ))),
        }
    }
}

/// Replace anything outside `[a-z0-9_.-]` with `_` and lowercase the result.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

pub fn report_filename(report: &Report, format: ExportFormat, generated_at: DateTime<Utc>) -> String {
    let mut target = sanitize_filename(&report.target);
    // Code targets can be whole source files.
    target.truncate(80);
    format!(
        "bugtrace-report-{}-{}.{}",
        target,
        generated_at.format("%Y-%m-%d"),
        format.extension()
    )
}

pub fn render_report(report: &Report, format: ExportFormat, generated_at: DateTime<Utc>) -> Result<String, BugtraceError> {
    match format {
        ExportFormat::Markdown => Ok(format_report_markdown(report, generated_at)),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

/// Write the report into `output_dir`, creating it if needed. Returns the file path.
pub async fn export_report(
    report: &Report,
    output_dir: &Path,
    format: ExportFormat,
    generated_at: DateTime<Utc>,
) -> Result<PathBuf, BugtraceError> {
    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(report_filename(report, format, generated_at));
    let content = render_report(report, format, generated_at)?;
    tokio::fs::write(&path, content).await?;
    info!(path = %path.display(), findings = report.total_findings(), "Report exported");
    Ok(path)
}
