use std::sync::OnceLock;

use regex::Regex;

fn fenced_block() -> Option<&'static Regex> {
    static FENCED: OnceLock<Option<Regex>> = OnceLock::new();
    FENCED
        .get_or_init(|| Regex::new(r"(?s)```(?i:json)?\s*(\{.*\}|\[.*\])\s*```").ok())
        .as_ref()
}

/// Locate the JSON payload inside a free-form model reply.
///
/// A fenced code block (optionally tagged `json`) holding an object or array
/// wins; otherwise the span from the first `{` to the last `}` is returned.
/// The result is not checked for validity.
pub fn extract_json(raw: &str) -> Option<&str> {
    if let Some(caps) = fenced_block().and_then(|re| re.captures(raw)) {
        if let Some(body) = caps.get(1) {
            return Some(body.as_str());
        }
    }

    let first = raw.find('{')?;
    let last = raw.rfind('}')?;
    (last > first).then(|| &raw[first..=last])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_json_block() {
        let raw = "Here you go:\n```json\n{\"vulnerabilities\": []}\n```\nGood luck!";
        assert_eq!(extract_json(raw), Some("{\"vulnerabilities\": []}"));
    }

    #[test]
    fn test_fenced_block_without_tag_and_array_body() {
        let raw = "```\n[{\"a\": 1}]\n```";
        assert_eq!(extract_json(raw), Some("[{\"a\": 1}]"));
    }

    #[test]
    fn test_uppercase_tag() {
        let raw = "```JSON\n{\"x\": true}\n```";
        assert_eq!(extract_json(raw), Some("{\"x\": true}"));
    }

    #[test]
    fn test_brace_span_fallback() {
        let raw = "Findings follow {\"analyzedTarget\": \"t\", \"vulnerabilities\": [{}]} end.";
        assert_eq!(
            extract_json(raw),
            Some("{\"analyzedTarget\": \"t\", \"vulnerabilities\": [{}]}")
        );
    }

    #[test]
    fn test_no_json() {
        assert_eq!(extract_json("I could not find anything."), None);
        assert_eq!(extract_json("} backwards {"), None);
        assert_eq!(extract_json(""), None);
    }

    #[test]
    fn test_fenced_prose_is_skipped_for_brace_span() {
        let raw = "```\nnot json\n```\nbut here: {\"ok\": 1}";
        assert_eq!(extract_json(raw), Some("{\"ok\": 1}"));
    }
}
