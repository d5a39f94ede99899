use crate::models::Finding;
use crate::pipeline::{AnalysisInput, ScanMode};
use super::catalog::PromptCatalog;
use super::personas::{focus_for, hostname};

const FINDING_SCHEMA: &str = r#"For EACH object inside the 'vulnerabilities' array, include these exact keys:
- "vulnerability": (string) The specific name of the weakness. Mandatory.
- "severity": (string) One of Critical, High, Medium, Low, Info.
- "description": (string) A step-by-step guide on how to reproduce the issue.
- "impact": (string) A specific, worst-case scenario an attacker could achieve.
- "vulnerableCode": (string) The working proof-of-concept payload or the vulnerable line(s).
- "recommendation": (string) A brief mitigation strategy.
- "injectionPoint": (object or null) {"type", "parameter", "method"} for injection issues, otherwise null."#;

const JSON_ONLY: &str =
    "Do not add any conversational text or markdown. The raw response must be only the JSON object.";

/// The prompt set compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPrompts;

impl BuiltinPrompts {
    pub fn new() -> Self {
        Self
    }

    fn report_format() -> String {
        format!(
            "Output format:\n\
             Your entire response MUST be a single JSON object with the keys 'analyzedTarget' and \
             'vulnerabilities'. 'vulnerabilities' is an array and is empty when nothing is found.\n\
             {}\n\n{}",
            FINDING_SCHEMA, JSON_ONLY
        )
    }

    fn url_scan(&self, input: &AnalysisInput, iteration: u32) -> String {
        let host = hostname(&input.target);
        let focus = focus_for(input.mode, iteration, &input.target);
        let methodology = match input.mode {
            ScanMode::Recon => format!(
                "Act as an expert bug bounty hunter performing reconnaissance on {}.\n\
                 Your primary goal is to {}\n\n\
                 Methodology:\n\
                 1. Search for known vulnerabilities and public exploits for `{}` and every technology you identify.\n\
                 2. Fingerprint the stack and look up issues affecting the exact versions in use.",
                input.target, focus, host
            ),
            ScanMode::Greybox => format!(
                "Act as an expert grey box penetration tester. Find exploitable vulnerabilities in {} \
                 by correlating dynamic behaviour with client-side code weaknesses.\n\
                 Your focus for this run is to {}\n\n\
                 Methodology:\n\
                 1. Enumerate every endpoint and input vector on `{}`.\n\
                 2. Fetch the linked JavaScript and look for DOM sinks, hardcoded secrets and hidden API routes.\n\
                 3. Correlate both views; a correlated finding's description must explain how the evidence combines.",
                input.target, focus, host
            ),
            _ => format!(
                "Act as a top-tier bug bounty hunter. Your task is to {}\n\n\
                 Methodology:\n\
                 1. Enumerate all pages, endpoints, parameters and headers on `site:{}`.\n\
                 2. Form exploitation hypotheses that match your focus and try to prove them.\n\
                 3. Every claimed finding needs a working proof-of-concept payload in \"vulnerableCode\".",
                focus, host
            ),
        };
        format!(
            "{}\n\n'analyzedTarget' MUST be {}.\n{}",
            methodology,
            input.target,
            Self::report_format()
        )
    }

    fn code_scan(&self, input: &AnalysisInput, iteration: u32) -> String {
        let persona = focus_for(ScanMode::Code, iteration, &input.target);
        format!(
            "Act as a {}.\n\
             Find exploitable vulnerabilities in the following code. Prioritize findings with a clear path to impact.\n\
             Set 'analyzedTarget' to '{}'.\n\n\
             Code to analyze:\n```\n{}\n```\n\n\
             For code findings \"vulnerableCode\" is the exact line(s) that introduce the flaw and \
             \"injectionPoint\" is null.\n{}",
            persona,
            input.report_target(),
            input.target,
            Self::report_format()
        )
    }
}

fn finding_json(finding: &Finding) -> String {
    serde_json::to_string_pretty(finding).unwrap_or_default()
}

impl PromptCatalog for BuiltinPrompts {
    fn scan_prompt(&self, input: &AnalysisInput, iteration: u32) -> String {
        match input.mode {
            ScanMode::Code => self.code_scan(input, iteration),
            _ => self.url_scan(input, iteration),
        }
    }

    fn consolidation_prompt(&self, reports_json: &str) -> String {
        format!(
            "Act as an expert security analyst. You are given a JSON array of vulnerability reports \
             produced by separate runs of an automated scanner.\n\
             Consolidate them into one de-duplicated report:\n\
             1. A duplicate has the same 'vulnerability' name and the same 'injectionPoint' (or both null).\n\
             2. Merge duplicates into one entry, keep the highest 'severity' among them and combine \
             'description', 'impact' and 'recommendation' taking the best details from each.\n\
             3. Take 'analyzedTarget' from the first report.\n\n\
             Input reports:\n```json\n{}\n```\n\n{}\n{}",
            reports_json, FINDING_SCHEMA, JSON_ONLY
        )
    }

    fn validation_prompt(&self, finding: &Finding) -> String {
        format!(
            "Act as an extremely skeptical senior security analyst. Decide whether the finding below \
             is genuine or a hallucination / false positive.\n\n\
             Finding to validate:\n```json\n{}\n```\n\n\
             Check the description for contradictions, judge whether the proof-of-concept in \
             \"vulnerableCode\" could realistically work, and look for counter-evidence such as a \
             known patch.\n\n\
             Respond with a single JSON object with exactly these keys:\n\
             - \"is_valid\": (boolean) true if the finding appears genuine, false otherwise.\n\
             - \"reasoning\": (string) a concise justification.\n{}",
            finding_json(finding),
            JSON_ONLY
        )
    }

    fn deep_analysis_prompt(&self, finding: &Finding, input: &AnalysisInput) -> String {
        let context = match input.mode {
            ScanMode::Code => format!("in this code:\n```\n{}\n```", input.target),
            _ => format!("on `{}`.", input.target),
        };
        let payload_rule = match input.mode {
            ScanMode::Code => "Re-evaluate and give the most accurate vulnerable line(s).",
            _ => "Give a more advanced, non-malicious proof-of-concept payload.",
        };
        format!(
            "You are a world-class security researcher focusing on **{}**.\n\
             A preliminary scan found this potential vulnerability {}\n\n\
             Initial finding:\n```json\n{}\n```\n\n\
             Return one updated JSON object ready for a bug bounty submission:\n\
             1. \"description\": a precise, step-by-step proof-of-concept guide.\n\
             2. \"impact\": a specific, high-impact scenario.\n\
             3. \"recommendation\": a concise fix, with before/after code if possible.\n\
             4. \"vulnerableCode\": {}\n\
             5. Keep \"vulnerability\", \"severity\" and \"injectionPoint\" identical to the original.\n{}",
            finding.name,
            context,
            finding_json(finding),
            payload_rule,
            JSON_ONLY
        )
    }

    fn correction_prompt(&self, original_prompt: &str, malformed: &str, error: &str) -> String {
        format!(
            "You are a JSON correction specialist. Your previous response could not be parsed.\n\n\
             1. Original request:\n```\n{}\n```\n\n\
             2. Your malformed response:\n```json\n{}\n```\n\n\
             3. Parser error:\n```\n{}\n```\n\n\
             Common mistakes are trailing commas, unescaped quotes inside strings and surrounding prose. \
             Respond with ONLY the corrected JSON that satisfies the original request's format. \
             The response must start with '{{' or '[' and end with '}}' or ']'.",
            original_prompt, malformed, error
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    #[test]
    fn test_scan_prompt_varies_by_iteration() {
        let prompts = BuiltinPrompts::new();
        let input = AnalysisInput::new("https://example.com", ScanMode::Active);
        let first = prompts.scan_prompt(&input, 0);
        let second = prompts.scan_prompt(&input, 1);
        assert_ne!(first, second);
        assert_eq!(first, prompts.scan_prompt(&input, 5));
        assert!(first.contains("site:example.com"));
    }

    #[test]
    fn test_code_prompt_embeds_source() {
        let prompts = BuiltinPrompts::new();
        let input = AnalysisInput::new("eval(req.query.x)", ScanMode::Code);
        let prompt = prompts.scan_prompt(&input, 0);
        assert!(prompt.contains("eval(req.query.x)"));
        assert!(prompt.contains("Analyzed Code Snippet"));
    }

    #[test]
    fn test_validation_prompt_uses_wire_names() {
        let mut finding = Finding::new("Reflected XSS", Severity::High);
        finding.proof_of_concept = "<script>alert(1)</script>".into();
        let prompt = BuiltinPrompts::new().validation_prompt(&finding);
        assert!(prompt.contains("\"vulnerability\": \"Reflected XSS\""));
        assert!(prompt.contains("\"is_valid\""));
    }

    #[test]
    fn test_correction_prompt_contains_all_parts() {
        let prompt = BuiltinPrompts::new().correction_prompt("ORIGINAL", "{bad", "EOF while parsing");
        assert!(prompt.contains("ORIGINAL"));
        assert!(prompt.contains("{bad"));
        assert!(prompt.contains("EOF while parsing"));
        assert!(prompt.contains("start with '{' or '['"));
    }
}
