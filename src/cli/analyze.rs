use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use console::style;
use reqwest::Url;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::commands::AnalyzeArgs;
use crate::cli::error::CliError;
use crate::cli::progress::AnalysisProgress;
use crate::config::{self, credentials::mask_key, BugtraceConfig};
use crate::errors::BugtraceError;
use crate::lifecycle::RequestLifecycle;
use crate::llm::catalog::looks_like_openrouter_key;
use crate::llm::{create_provider, ApiOptions, Caller, LLMProvider};
use crate::pipeline::{AnalysisInput, AnalysisPipeline, AnalysisRequest, PipelineOutcome, ScanMode};
use crate::prompts::{BuiltinPrompts, FilePromptCatalog, PromptCatalog};
use crate::reporting::{export_report, ExportFormat};
use crate::utils::format_duration;

/// CLI arguments merged over the config file.
struct AnalyzeSettings {
    provider: String,
    options: ApiOptions,
    request: AnalysisRequest,
    prompts_dir: Option<PathBuf>,
    output_dir: PathBuf,
    format: ExportFormat,
}

pub async fn handle_analyze(args: AnalyzeArgs, quiet: bool) -> Result<(), CliError> {
    let file_config = match &args.config {
        Some(path) => config::parse_config(Path::new(path)).await?,
        None => BugtraceConfig::default(),
    };
    let settings = build_settings(&args, &file_config).await?;

    let provider: Arc<dyn LLMProvider> = Arc::from(create_provider(&settings.provider, &settings.options)?);
    let lifecycle = Arc::new(RequestLifecycle::new(file_config.lifecycle_config()));
    let prompts: Arc<dyn PromptCatalog> = match &settings.prompts_dir {
        Some(dir) => Arc::new(FilePromptCatalog::new(dir.clone())?),
        None => Arc::new(BuiltinPrompts::new()),
    };

    info!(
        provider = %settings.provider,
        model = %settings.options.model,
        mode = %settings.request.input.mode,
        depth = settings.request.effective_depth(),
        "Starting analysis"
    );

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let pipeline = Arc::new(
        AnalysisPipeline::new(Caller::new(provider, lifecycle.clone()), prompts).with_event_channel(event_tx),
    );
    let mut status_rx = lifecycle.subscribe_status();
    let mut count_rx = lifecycle.subscribe_call_count();
    let mut progress = AnalysisProgress::new(quiet);

    let mut run = {
        let pipeline = pipeline.clone();
        let request = settings.request.clone();
        tokio::spawn(async move { pipeline.run(&request).await })
    };

    let mut cancelling = false;
    let joined = loop {
        tokio::select! {
            joined = &mut run => break joined,
            Some(event) = event_rx.recv() => progress.handle_event(&event),
            Ok(status) = status_rx.recv() => progress.set_status(status),
            Ok(count) = count_rx.recv() => progress.set_calls(count),
            signal = tokio::signal::ctrl_c(), if !cancelling => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                cancelling = true;
                progress.println(&format!("{} Cancelling...", style("!").yellow().bold()));
                pipeline.cancel().await;
            }
        }
    };
    while let Ok(event) = event_rx.try_recv() {
        progress.handle_event(&event);
    }
    progress.finish();

    let result = joined.map_err(|e| BugtraceError::Internal(format!("Analysis task failed: {}", e)))?;
    let mut outcome = result?;
    outcome.report.id = Some(uuid::Uuid::new_v4().to_string());

    print_summary(&outcome, quiet);
    let path = export_report(&outcome.report, &settings.output_dir, settings.format, Utc::now()).await?;
    println!("Report written to {}", style(path.display()).cyan());
    Ok(())
}

async fn build_settings(args: &AnalyzeArgs, file_config: &BugtraceConfig) -> Result<AnalyzeSettings, BugtraceError> {
    let mode = match &args.mode {
        Some(m) => m.parse::<ScanMode>()?,
        None => file_config.mode(),
    };
    let input = load_input(&args.target, mode).await?;

    let provider = file_config.provider();
    let model = args.model.clone().unwrap_or_else(|| file_config.model());
    let api_key = args
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| file_config.api_key())
        .ok_or_else(|| {
            BugtraceError::Config(format!(
                "API Key is not configured. Pass --api-key, set llm.api_key or export {}",
                config::API_KEY_ENV
            ))
        })?;
    debug!(api_key = %mask_key(&api_key), "Resolved API key");
    if provider == "openrouter" && !looks_like_openrouter_key(&api_key) {
        warn!("API key does not look like an OpenRouter key (expected an sk-or- prefix)");
    }

    let mut options = ApiOptions::new(&api_key, &model);
    if let Some(llm) = &file_config.llm {
        options.base_url = llm.base_url.clone();
        options.timeout_secs = llm.timeout_secs;
    }

    let mut request = AnalysisRequest::new(input, args.depth.unwrap_or_else(|| file_config.depth()));
    request.validate = !args.no_validate && file_config.validate_findings();
    request.deep_analysis = args.deep || file_config.deep_analysis();

    let format = match &args.format {
        Some(f) => f.parse::<ExportFormat>()?,
        None => file_config.output_format(),
    };

    Ok(AnalyzeSettings {
        provider,
        options,
        request,
        prompts_dir: file_config.prompts_dir(),
        output_dir: args.output.as_ref().map(PathBuf::from).unwrap_or_else(|| file_config.output_dir()),
        format,
    })
}

/// URL modes need an http(s) URL. Code mode reads the target as a file when
/// one exists at that path and treats it as inline source otherwise.
async fn load_input(target: &str, mode: ScanMode) -> Result<AnalysisInput, BugtraceError> {
    if mode.is_url_scan() {
        let url = Url::parse(target)
            .map_err(|e| BugtraceError::Config(format!("Invalid target URL '{}': {}", target, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(BugtraceError::Config(format!(
                "Target URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        return Ok(AnalysisInput::new(target, mode));
    }

    let path = Path::new(target);
    let source = if path.is_file() {
        tokio::fs::read_to_string(path).await?
    } else {
        target.to_string()
    };
    if source.trim().is_empty() {
        return Err(BugtraceError::Config("Nothing to analyze: the code target is empty".into()));
    }
    Ok(AnalysisInput::new(source, mode))
}

fn print_summary(outcome: &PipelineOutcome, quiet: bool) {
    let report = &outcome.report;
    let stats = &outcome.stats;
    if !quiet && report.is_empty() {
        println!("  {}", style("No vulnerabilities found.").green());
    }
    println!(
        "{} findings | runs {}/{} succeeded | {} filtered | {} enriched | {} calls | {}",
        report.total_findings(),
        stats.attempts_succeeded,
        stats.attempts_succeeded + stats.attempts_failed,
        stats.findings_filtered,
        stats.findings_enriched,
        stats.calls_dispatched,
        format_duration(stats.elapsed_ms),
    );
}
