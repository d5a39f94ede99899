use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::lifecycle::RequestStatus;
use crate::models::Severity;
use crate::pipeline::{PipelineEvent, PipelineStage};
use crate::utils::{display_target, format_duration, pluralize};

/// Spinner plus styled step log for a running analysis.
pub struct AnalysisProgress {
    spinner: ProgressBar,
    quiet: bool,
    stage: String,
    status: RequestStatus,
    calls: u64,
}

impl AnalysisProgress {
    pub fn new(quiet: bool) -> Self {
        let spinner = if quiet { ProgressBar::hidden() } else { ProgressBar::new_spinner() };
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        let progress = Self {
            spinner,
            quiet,
            stage: "Starting".to_string(),
            status: RequestStatus::Idle,
            calls: 0,
        };
        progress.update_status();
        progress
    }

    pub fn handle_event(&mut self, event: &PipelineEvent) {
        match event {
            PipelineEvent::PipelineStarted { target, mode, depth } => {
                self.println(&format!(
                    "{} Analyzing {} ({} mode, {})",
                    style("▶").green().bold(),
                    style(display_target(target)).white().bold(),
                    mode,
                    pluralize(*depth as u64, "run"),
                ));
            }
            PipelineEvent::StageStarted { stage, display_name, description } => {
                self.stage = display_name.clone();
                self.update_status();
                if !matches!(stage, PipelineStage::Done | PipelineStage::Failed) {
                    self.println(&render_stage(display_name, description));
                }
            }
            PipelineEvent::Step { message } => {
                self.println(&render_step(message));
            }
            PipelineEvent::FindingDiscovered { name, severity } => {
                self.println(&format!("  {} {}", severity_badge(*severity), name));
            }
            PipelineEvent::PipelineCompleted { total_findings, total_calls, total_duration_ms } => {
                self.spinner.finish_and_clear();
                self.println(&format!(
                    "{} Analysis complete: {} | {} | {}",
                    style("✓").green().bold(),
                    pluralize(*total_findings as u64, "finding"),
                    pluralize(*total_calls, "call"),
                    format_duration(*total_duration_ms),
                ));
            }
            PipelineEvent::PipelineFailed { error } => {
                self.spinner.finish_and_clear();
                self.println(&format!("{} {}", style("✗").red().bold(), style(error).red()));
            }
        }
    }

    pub fn set_status(&mut self, status: RequestStatus) {
        self.status = status;
        self.update_status();
    }

    pub fn set_calls(&mut self, calls: u64) {
        self.calls = calls;
        self.update_status();
    }

    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }

    pub fn println(&self, line: &str) {
        if self.quiet {
            return;
        }
        self.spinner.suspend(|| println!("{}", line));
    }

    fn update_status(&self) {
        let status = match self.status {
            RequestStatus::Idle => style("idle").dim(),
            RequestStatus::Active => style("waiting for model").cyan(),
            RequestStatus::Stopping => style("stopping").yellow(),
        };
        self.spinner.set_message(format!(
            "{} | {} | {}",
            self.stage,
            status,
            pluralize(self.calls, "call")
        ));
    }
}

fn render_stage(display_name: &str, description: &str) -> String {
    if description.is_empty() {
        return style(display_name).bold().to_string();
    }
    format!("{} {}", style(display_name).bold(), style(format!("({})", description)).dim())
}

fn render_step(message: &str) -> String {
    if message.starts_with("Run ") && message.contains(" failed: ") {
        format!("  {} {}", style("✗").red(), style(message).red())
    } else if message.starts_with("Run ") {
        format!("  {} {}", style("✓").green(), message)
    } else if message.starts_with("Filtering potential false positive") {
        format!("  {} {}", style("⚑").yellow(), style(message).yellow())
    } else if message.ends_with("keeping original finding.") {
        format!("  {} {}", style("!").yellow(), style(message).dim())
    } else {
        format!("  {} {}", style("·").cyan(), message)
    }
}

/// Colored severity label for terminal output.
pub fn severity_badge(severity: Severity) -> String {
    let label = format!("[{}]", severity.as_str().to_uppercase());
    match severity {
        Severity::Critical => style(label).red().bold().to_string(),
        Severity::High => style(label).red().to_string(),
        Severity::Medium => style(label).yellow().to_string(),
        Severity::Low => style(label).blue().to_string(),
        Severity::Info | Severity::Unknown => style(label).dim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_step_keeps_message() {
        console::set_colors_enabled(false);
        assert_eq!(render_step("Run 2 failed: timeout"), "  ✗ Run 2 failed: timeout");
        assert_eq!(
            render_step("Run 1 completed. Found 3 potential findings."),
            "  ✓ Run 1 completed. Found 3 potential findings."
        );
        assert_eq!(
            render_step("Validation failed, keeping original finding."),
            "  ! Validation failed, keeping original finding."
        );
    }

    #[test]
    fn test_render_stage_with_description() {
        console::set_colors_enabled(false);
        assert_eq!(
            render_stage("Validation", "Filtering likely false positives"),
            "Validation (Filtering likely false positives)"
        );
        assert_eq!(render_stage("Done", ""), "Done");
    }

    #[test]
    fn test_severity_badge_plain() {
        console::set_colors_enabled(false);
        assert_eq!(severity_badge(Severity::Critical), "[CRITICAL]");
    }
}
