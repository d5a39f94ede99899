use std::path::{Path, PathBuf};
use regex::Regex;
use crate::errors::BugtraceError;
use tracing::debug;

/// Values substituted into `{{VARIABLE}}` placeholders of a prompt template.
#[derive(Debug, Clone, Default)]
pub struct PromptVariables {
    pub target: String,
    pub hostname: String,
    pub mode: String,
    pub focus: Option<String>,
    pub finding_json: Option<String>,
    pub reports_json: Option<String>,
    pub original_prompt: Option<String>,
    pub malformed_json: Option<String>,
    pub parse_error: Option<String>,
}

/// Reads prompt templates from a directory, expanding `@include(path)` directives.
pub struct PromptLoader {
    prompts_dir: PathBuf,
}

const MAX_INCLUDE_DEPTH: u8 = 5;

impl PromptLoader {
    pub fn new(prompts_dir: PathBuf) -> Self {
        debug!(dir = %prompts_dir.display(), "PromptLoader initialized");
        Self { prompts_dir }
    }

    /// Load a template by name (without the .txt extension).
    pub fn load(&self, prompt_name: &str) -> Result<String, BugtraceError> {
        let file_path = self.prompts_dir.join(format!("{}.txt", prompt_name));
        if !file_path.exists() {
            return Err(BugtraceError::Prompt(format!(
                "Prompt file not found: {}",
                file_path.display()
            )));
        }
        let content = std::fs::read_to_string(&file_path).map_err(|e| {
            BugtraceError::Prompt(format!("Failed to read prompt {}: {}", file_path.display(), e))
        })?;
        self.process_includes(&content, 0)
    }

    /// Replace placeholders with values from `vars`. Unset values become empty.
    pub fn interpolate(&self, template: &str, vars: &PromptVariables) -> String {
        let mut result = template.to_string();

        let replacements: &[(&str, &str)] = &[
            ("{{TARGET}}", &vars.target),
            ("{{HOSTNAME}}", &vars.hostname),
            ("{{MODE}}", &vars.mode),
        ];
        for (placeholder, value) in replacements {
            result = result.replace(placeholder, value);
        }

        let optional_replacements: &[(&str, &Option<String>)] = &[
            ("{{FOCUS}}", &vars.focus),
            ("{{FINDING_JSON}}", &vars.finding_json),
            ("{{REPORTS_JSON}}", &vars.reports_json),
            ("{{ORIGINAL_PROMPT}}", &vars.original_prompt),
            ("{{MALFORMED_JSON}}", &vars.malformed_json),
            ("{{PARSE_ERROR}}", &vars.parse_error),
        ];
        for (placeholder, value) in optional_replacements {
            result = result.replace(placeholder, value.as_deref().unwrap_or(""));
        }

        result
    }

    fn process_includes(&self, content: &str, depth: u8) -> Result<String, BugtraceError> {
        if depth >= MAX_INCLUDE_DEPTH {
            return Err(BugtraceError::Prompt(format!(
                "Include depth limit ({}) exceeded, possible circular include",
                MAX_INCLUDE_DEPTH
            )));
        }

        let include_re = Regex::new(r"@include\(([^)]+)\)")
            .map_err(|e| BugtraceError::Internal(format!("Invalid include pattern: {}", e)))?;
        let mut result = content.to_string();

        let matches: Vec<(String, String)> = include_re
            .captures_iter(content)
            .map(|cap| (cap[0].to_string(), cap[1].to_string()))
            .collect();

        for (full_match, include_path) in matches {
            let file_path = self.prompts_dir.join(include_path.trim());
            let included = std::fs::read_to_string(&file_path).map_err(|e| {
                BugtraceError::Prompt(format!(
                    "Failed to read included file {} (referenced as {}): {}",
                    file_path.display(),
                    full_match,
                    e
                ))
            })?;
            let processed = self.process_includes(&included, depth + 1)?;
            result = result.replace(&full_match, &processed);
        }

        Ok(result)
    }

    pub fn has_prompt(&self, prompt_name: &str) -> bool {
        self.prompts_dir.join(format!("{}.txt", prompt_name)).exists()
    }

    pub fn prompts_dir(&self) -> &Path {
        &self.prompts_dir
    }
}
