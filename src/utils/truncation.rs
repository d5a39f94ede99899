const MAX_DISPLAY_LENGTH: usize = 120;

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Single-line preview of a target for terminal output. Code targets are
/// reduced to their first line.
pub fn display_target(target: &str) -> String {
    let first_line = target.lines().next().unwrap_or_default();
    let preview = truncate_chars(first_line, MAX_DISPLAY_LENGTH);
    if target.lines().nth(1).is_some() && !preview.ends_with("...") {
        format!("{}...", preview)
    } else {
        preview
    }
}
