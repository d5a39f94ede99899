use std::collections::HashMap;
use std::path::PathBuf;

use tracing::info;

use crate::errors::BugtraceError;
use crate::models::Finding;
use crate::pipeline::{AnalysisInput, ScanMode};
use super::builtin::BuiltinPrompts;
use super::catalog::PromptCatalog;
use super::loader::{PromptLoader, PromptVariables};
use super::personas::{focus_for, hostname};

/// Template names looked up in the override directory.
pub const OVERRIDABLE_PROMPTS: &[&str] = &[
    "scan-recon",
    "scan-active",
    "scan-greybox",
    "scan-code",
    "consolidate",
    "validate",
    "deep-analysis",
    "correct-json",
];

/// Prompt catalog backed by `<name>.txt` overrides on disk, falling back to
/// the built-in prompt for every template that is not present.
///
/// Templates are read once at construction so prompt building never touches
/// the filesystem mid-run.
pub struct FilePromptCatalog {
    loader: PromptLoader,
    overrides: HashMap<&'static str, String>,
    fallback: BuiltinPrompts,
}

impl FilePromptCatalog {
    pub fn new(prompts_dir: PathBuf) -> Result<Self, BugtraceError> {
        if !prompts_dir.is_dir() {
            return Err(BugtraceError::Prompt(format!(
                "Prompt directory not found: {}",
                prompts_dir.display()
            )));
        }
        let loader = PromptLoader::new(prompts_dir);
        let mut overrides = HashMap::new();
        for name in OVERRIDABLE_PROMPTS {
            if loader.has_prompt(name) {
                overrides.insert(*name, loader.load(name)?);
            }
        }
        info!(
            dir = %loader.prompts_dir().display(),
            overrides = overrides.len(),
            "Loaded prompt overrides"
        );
        Ok(Self { loader, overrides, fallback: BuiltinPrompts::new() })
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    fn render(&self, name: &str, vars: PromptVariables) -> Option<String> {
        self.overrides.get(name).map(|t| self.loader.interpolate(t, &vars))
    }

    fn input_vars(input: &AnalysisInput) -> PromptVariables {
        PromptVariables {
            target: input.target.clone(),
            hostname: if input.mode.is_url_scan() { hostname(&input.target) } else { String::new() },
            mode: input.mode.to_string(),
            ..Default::default()
        }
    }
}

fn scan_template(mode: ScanMode) -> &'static str {
    match mode {
        ScanMode::Recon => "scan-recon",
        ScanMode::Active => "scan-active",
        ScanMode::Greybox => "scan-greybox",
        ScanMode::Code => "scan-code",
    }
}

impl PromptCatalog for FilePromptCatalog {
    fn scan_prompt(&self, input: &AnalysisInput, iteration: u32) -> String {
        let vars = PromptVariables {
            focus: Some(focus_for(input.mode, iteration, &input.target)),
            ..Self::input_vars(input)
        };
        self.render(scan_template(input.mode), vars)
            .unwrap_or_else(|| self.fallback.scan_prompt(input, iteration))
    }

    fn consolidation_prompt(&self, reports_json: &str) -> String {
        let vars = PromptVariables {
            reports_json: Some(reports_json.to_string()),
            ..Default::default()
        };
        self.render("consolidate", vars)
            .unwrap_or_else(|| self.fallback.consolidation_prompt(reports_json))
    }

    fn validation_prompt(&self, finding: &Finding) -> String {
        let vars = PromptVariables {
            finding_json: serde_json::to_string_pretty(finding).ok(),
            ..Default::default()
        };
        self.render("validate", vars)
            .unwrap_or_else(|| self.fallback.validation_prompt(finding))
    }

    fn deep_analysis_prompt(&self, finding: &Finding, input: &AnalysisInput) -> String {
        let vars = PromptVariables {
            finding_json: serde_json::to_string_pretty(finding).ok(),
            ..Self::input_vars(input)
        };
        self.render("deep-analysis", vars)
            .unwrap_or_else(|| self.fallback.deep_analysis_prompt(finding, input))
    }

    fn correction_prompt(&self, original_prompt: &str, malformed: &str, error: &str) -> String {
        let vars = PromptVariables {
            original_prompt: Some(original_prompt.to_string()),
            malformed_json: Some(malformed.to_string()),
            parse_error: Some(error.to_string()),
            ..Default::default()
        };
        self.render("correct-json", vars)
            .unwrap_or_else(|| self.fallback.correction_prompt(original_prompt, malformed, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use crate::models::Severity;

    #[test]
    fn test_override_is_used_and_interpolated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("scan-active.txt"), "Scan {{HOSTNAME}}: {{FOCUS}}").unwrap();
        let catalog = FilePromptCatalog::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(catalog.override_count(), 1);

        let input = AnalysisInput::new("https://example.com/login", ScanMode::Active);
        let prompt = catalog.scan_prompt(&input, 0);
        assert!(prompt.starts_with("Scan example.com: perform a simulated ACTIVE scan"));
    }

    #[test]
    fn test_missing_override_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FilePromptCatalog::new(dir.path().to_path_buf()).unwrap();
        let finding = Finding::new("CSRF", Severity::Medium);
        assert_eq!(
            catalog.validation_prompt(&finding),
            BuiltinPrompts::new().validation_prompt(&finding)
        );
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FilePromptCatalog::new(dir.path().join("nope"));
        assert!(matches!(result, Err(BugtraceError::Prompt(_))));
    }

    #[test]
    fn test_broken_include_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("validate.txt"), "@include(missing.txt)").unwrap();
        assert!(FilePromptCatalog::new(dir.path().to_path_buf()).is_err());
    }
}
