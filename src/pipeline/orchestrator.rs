use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::errors::BugtraceError;
use crate::llm::Caller;
use crate::models::{AnalysisAttempt, Finding, Report, ValidationVerdict};
use crate::parsing::{extract_json, parse_with_correction};
use crate::prompts::PromptCatalog;
use super::events::PipelineEvent;
use super::phase;
use super::state::*;

/// Step log of one run, mirrored to the event channel as it grows.
struct RunLog<'a> {
    steps: Vec<String>,
    event_tx: Option<&'a mpsc::UnboundedSender<PipelineEvent>>,
}

impl<'a> RunLog<'a> {
    fn step(&mut self, message: String) {
        info!(step = %message, "Pipeline step");
        if let Some(tx) = self.event_tx {
            let _ = tx.send(PipelineEvent::Step { message: message.clone() });
        }
        self.steps.push(message);
    }
}

/// Multi-pass analysis: independent scans, consolidation, then optional
/// validation and deep analysis of each finding.
///
/// Calls are strictly sequential and all go through the shared `Caller`, so
/// they are rate limited and circuit broken together.
pub struct AnalysisPipeline {
    caller: Caller,
    prompts: Arc<dyn PromptCatalog>,
    cancel_token: CancellationToken,
    event_tx: Option<mpsc::UnboundedSender<PipelineEvent>>,
}

impl AnalysisPipeline {
    pub fn new(caller: Caller, prompts: Arc<dyn PromptCatalog>) -> Self {
        let cancel_token = CancellationToken::new();
        Self {
            caller: caller.with_run_token(cancel_token.clone()),
            prompts,
            cancel_token,
            event_tx: None,
        }
    }

    /// Use an external run token, so cancelling it stops the pipeline.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.caller = self.caller.with_run_token(token.clone());
        self.cancel_token = token;
        self
    }

    /// Attach an event channel for streaming progress to a live consumer.
    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    fn emit_stage_started(&self, stage: PipelineStage) {
        self.emit(PipelineEvent::StageStarted {
            stage,
            display_name: phase::display_name(stage).to_string(),
            description: phase::description(stage).to_string(),
        });
    }

    /// Stop the run at its next checkpoint and abort the in-flight call.
    pub async fn cancel(&self) {
        self.cancel_token.cancel();
        self.caller.lifecycle().cancel_active().await;
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    fn checkpoint(&self, stage: PipelineStage) -> Result<(), PipelineError> {
        if self.cancel_token.is_cancelled() {
            return Err(self.cancelled(stage));
        }
        Ok(())
    }

    fn cancelled(&self, stage: PipelineStage) -> PipelineError {
        info!(stage = %stage, "Analysis cancelled");
        let err = PipelineError::Cancelled { stage };
        self.emit_stage_started(PipelineStage::Failed);
        self.emit(PipelineEvent::PipelineFailed { error: err.to_string() });
        err
    }

    fn fail(&self, err: PipelineError) -> PipelineError {
        warn!(error = %err, "Analysis failed");
        self.emit_stage_started(PipelineStage::Failed);
        self.emit(PipelineEvent::PipelineFailed { error: err.to_string() });
        err
    }

    pub async fn run(&self, request: &AnalysisRequest) -> Result<PipelineOutcome, PipelineError> {
        let started = Instant::now();
        let lifecycle = self.caller.lifecycle();
        let calls_before = lifecycle.call_count().await;
        let input = &request.input;
        let depth = request.effective_depth();

        info!(
            target = %input.target.chars().take(120).collect::<String>(),
            mode = %input.mode,
            depth,
            validate = request.validate,
            deep_analysis = request.deep_analysis,
            "Analysis started"
        );
        self.emit(PipelineEvent::PipelineStarted {
            target: input.target.clone(),
            mode: input.mode.to_string(),
            depth,
        });

        let mut log = RunLog { steps: Vec::new(), event_tx: self.event_tx.as_ref() };
        let mut stats = RunStats::default();

        // Scanning
        self.emit_stage_started(PipelineStage::Scanning);
        let mut attempts = Vec::with_capacity(depth as usize);
        for i in 0..depth {
            self.checkpoint(PipelineStage::Scanning)?;
            log.step(format!("Executing analysis run {} of {}...", i + 1, depth));
            match self.scan_once(input, i).await {
                Ok(report) => {
                    log.step(format!(
                        "Run {} completed. Found {} potential findings.",
                        i + 1,
                        report.total_findings()
                    ));
                    stats.attempts_succeeded += 1;
                    attempts.push(AnalysisAttempt::succeeded(i, report));
                }
                Err(e) if e.is_cancelled() => return Err(self.cancelled(PipelineStage::Scanning)),
                Err(e) => {
                    warn!(run = i + 1, error_type = e.classify().error_type, error = %e, "Analysis run failed");
                    log.step(format!("Run {} failed: {}", i + 1, e));
                    stats.attempts_failed += 1;
                    attempts.push(AnalysisAttempt::failed(i, e.to_string()));
                }
            }
        }

        let successful: Vec<&Report> = attempts.iter().filter_map(|a| a.report.as_ref()).collect();
        if successful.is_empty() {
            let failures = attempts
                .iter()
                .filter_map(|a| a.error.as_ref().map(|e| format!("Run {}: {}", a.run_number(), e)))
                .collect();
            return Err(self.fail(PipelineError::AllAttemptsFailed { failures }));
        }

        // Consolidating
        self.checkpoint(PipelineStage::Consolidating)?;
        self.emit_stage_started(PipelineStage::Consolidating);
        let mut report = if successful.len() == 1 {
            successful[0].clone()
        } else {
            log.step(format!("Consolidating {} reports with AI...", successful.len()));
            match self.consolidate(&successful).await {
                Ok(report) => {
                    log.step("Consolidation complete.".to_string());
                    report
                }
                Err(e) if e.is_cancelled() => return Err(self.cancelled(PipelineStage::Consolidating)),
                Err(e) => return Err(self.fail(PipelineError::Consolidation(e))),
            }
        };

        // Validating
        if request.validate && !report.is_empty() {
            self.emit_stage_started(PipelineStage::Validating);
            let total = report.findings.len();
            let mut kept = Vec::with_capacity(total);
            for (i, finding) in std::mem::take(&mut report.findings).into_iter().enumerate() {
                self.checkpoint(PipelineStage::Validating)?;
                log.step(format!("[{}/{}] Validating finding: {}...", i + 1, total, finding.name));
                match self.validate(&finding).await {
                    Ok(verdict) if verdict.rejects() => {
                        log.step(format!(
                            "Filtering potential false positive: {} ({})",
                            finding.name, verdict.reasoning
                        ));
                        stats.findings_filtered += 1;
                    }
                    Ok(_) => kept.push(finding),
                    Err(e) if e.is_cancelled() => return Err(self.cancelled(PipelineStage::Validating)),
                    Err(e) => {
                        warn!(finding = %finding.name, error = %e, "Validation failed");
                        log.step("Validation failed, keeping original finding.".to_string());
                        kept.push(finding);
                    }
                }
            }
            report.findings = kept;
        }

        // Deep analysis
        if request.deep_analysis && !report.is_empty() {
            self.emit_stage_started(PipelineStage::DeepAnalyzing);
            let total = report.findings.len();
            let mut enriched = Vec::with_capacity(total);
            for (i, finding) in std::mem::take(&mut report.findings).into_iter().enumerate() {
                self.checkpoint(PipelineStage::DeepAnalyzing)?;
                log.step(format!("[{}/{}] Deep analysis of: {}...", i + 1, total, finding.name));
                match self.deep_analyze(&finding, input).await {
                    Ok(deep) => {
                        stats.findings_enriched += 1;
                        enriched.push(finding.merge_enriched(deep));
                    }
                    Err(e) if e.is_cancelled() => return Err(self.cancelled(PipelineStage::DeepAnalyzing)),
                    Err(e) => {
                        warn!(finding = %finding.name, error = %e, "Deep analysis failed");
                        log.step("Deep analysis failed, keeping original finding.".to_string());
                        enriched.push(finding);
                    }
                }
            }
            report.findings = enriched;
        }

        log.step("Final report generation complete.".to_string());
        self.emit_stage_started(PipelineStage::Done);
        for finding in &report.findings {
            self.emit(PipelineEvent::FindingDiscovered {
                name: finding.name.clone(),
                severity: finding.severity,
            });
        }

        stats.calls_dispatched = lifecycle.call_count().await.saturating_sub(calls_before);
        stats.elapsed_ms = started.elapsed().as_millis() as u64;
        self.emit(PipelineEvent::PipelineCompleted {
            total_findings: report.total_findings(),
            total_calls: stats.calls_dispatched,
            total_duration_ms: stats.elapsed_ms,
        });
        info!(
            findings = report.total_findings(),
            calls = stats.calls_dispatched,
            elapsed_ms = stats.elapsed_ms,
            "Analysis completed"
        );

        Ok(PipelineOutcome { report, steps: log.steps, attempts, stats })
    }

    async fn scan_once(&self, input: &AnalysisInput, iteration: u32) -> Result<Report, BugtraceError> {
        let prompt = self.prompts.scan_prompt(input, iteration);
        let raw = self.caller.invoke(&prompt, input.mode.uses_json_mode()).await?;

        let report: Report = if input.mode.is_url_scan() {
            match extract_json(&raw) {
                Some(json) => parse_with_correction(json, &prompt, &self.caller, self.prompts.as_ref()).await?,
                None => {
                    warn!(run = iteration + 1, reply_len = raw.len(), "Reply contained no JSON, using an empty report");
                    Report::new(input.report_target())
                }
            }
        } else {
            parse_with_correction(&raw, &prompt, &self.caller, self.prompts.as_ref()).await?
        };

        Ok(report.with_fallback_target(input.report_target()))
    }

    async fn consolidate(&self, reports: &[&Report]) -> Result<Report, BugtraceError> {
        let reports_json = serde_json::to_string(reports)?;
        let prompt = self.prompts.consolidation_prompt(&reports_json);
        let raw = self.caller.invoke(&prompt, true).await?;
        let report: Report = parse_with_correction(&raw, &prompt, &self.caller, self.prompts.as_ref()).await?;
        let first_target = reports.first().map(|r| r.target.as_str()).unwrap_or_default();
        Ok(report.with_fallback_target(first_target))
    }

    async fn validate(&self, finding: &Finding) -> Result<ValidationVerdict, BugtraceError> {
        let prompt = self.prompts.validation_prompt(finding);
        let raw = self.caller.invoke(&prompt, true).await?;
        parse_with_correction(&raw, &prompt, &self.caller, self.prompts.as_ref()).await
    }

    async fn deep_analyze(&self, finding: &Finding, input: &AnalysisInput) -> Result<Finding, BugtraceError> {
        let prompt = self.prompts.deep_analysis_prompt(finding, input);
        let raw = self.caller.invoke(&prompt, true).await?;
        parse_with_correction(&raw, &prompt, &self.caller, self.prompts.as_ref()).await
    }
}
