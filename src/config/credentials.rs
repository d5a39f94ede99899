use tracing::debug;

/// Resolve a credential value. A value starting with '$' names an
/// environment variable; the literal is kept when the variable is unset.
pub fn resolve_credential(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        match std::env::var(var_name) {
            Ok(resolved) => {
                debug!(var = %var_name, "Resolved credential from environment");
                resolved
            }
            Err(_) => {
                debug!(var = %var_name, "Environment variable not set, using literal");
                value.to_string()
            }
        }
    } else {
        value.to_string()
    }
}

/// Mask an API key for display, keeping a short prefix and suffix.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 10 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Replace every occurrence of the given secrets with [REDACTED].
pub fn redact_credentials(text: &str, secrets: &[&str]) -> String {
    let mut result = text.to_string();
    for secret in secrets {
        if secret.len() >= 4 {
            result = result.replace(secret, "[REDACTED]");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_passthrough() {
        assert_eq!(resolve_credential("sk-or-abc"), "sk-or-abc");
    }

    #[test]
    fn test_unset_env_reference_kept_literally() {
        assert_eq!(
            resolve_credential("$BUGTRACE_TEST_SURELY_UNSET_VAR"),
            "$BUGTRACE_TEST_SURELY_UNSET_VAR"
        );
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-or-v1-0123456789abcdef"), "sk-or-...cdef");
        assert_eq!(mask_key("short"), "*****");
    }

    #[test]
    fn test_redact() {
        let text = "request failed for key sk-or-secret";
        assert_eq!(redact_credentials(text, &["sk-or-secret", ""]), "request failed for key [REDACTED]");
    }
}
