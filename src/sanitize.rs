//! Raw model-output cleanup before parsing.
//!
//! Models wrap JSON in markdown fences and truncate output at the token cap.
//! Each step here is independently idempotent and best-effort: the result is
//! "repaired enough to attempt parsing", not guaranteed-valid JSON.

use std::sync::LazyLock;

use regex::Regex;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```(?:json)?\s*\n?(.*?)\n?\s*```\s*$").expect("valid regex")
});
static TRUNCATED_STRING_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"\s*:\s*"([^"]+)$"#).expect("valid regex"));

/// Sanitize a raw model response for JSON parsing.
pub fn sanitize_response(raw: &str) -> String {
    let unfenced = strip_code_fences(raw);
    let trimmed = unfenced.trim();
    let balanced = balance_braces(trimmed);
    close_truncated_string(&balanced)
}

/// Remove a wrapping code-fence block if the whole response is one; else
/// strip a leading fence token and/or trailing fence token independently.
/// A truncated response may carry only one of the two.
fn strip_code_fences(text: &str) -> String {
    if let Some(captures) = FENCED_BLOCK.captures(text) {
        return captures[1].to_string();
    }

    let mut out = text.trim();
    if let Some(rest) = out.strip_prefix("```json") {
        out = rest;
    } else if let Some(rest) = out.strip_prefix("```") {
        out = rest;
    }
    if let Some(rest) = out.trim_end().strip_suffix("```") {
        out = rest;
    }
    out.to_string()
}

/// Append the deficit of closing braces. Assumes truncation only ever loses
/// trailing closers, never adds spurious ones.
fn balance_braces(text: &str) -> String {
    let opens = text.matches('{').count();
    let closes = text.matches('}').count();
    if opens > closes {
        let deficit = opens - closes;
        tracing::debug!(deficit, "appending closing braces to repair truncation");
        let mut repaired = text.to_string();
        repaired.extend(std::iter::repeat('}').take(deficit));
        repaired
    } else {
        text.to_string()
    }
}

/// Close an unterminated quoted string value at end of text
/// (`"key": "value` with no closing quote). Brace balancing may already have
/// appended closers after the cut point, so the check ignores a trailing
/// brace run and the quote is inserted before it.
fn close_truncated_string(text: &str) -> String {
    let cut = text.trim_end_matches(|c: char| c == '}' || c.is_whitespace()).len();
    if TRUNCATED_STRING_TAIL.is_match(&text[..cut]) {
        tracing::debug!("closing unterminated trailing string value");
        let mut repaired = String::with_capacity(text.len() + 1);
        repaired.push_str(&text[..cut]);
        repaired.push('"');
        repaired.push_str(&text[cut..]);
        repaired
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_full_fenced_block() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(sanitize_response(raw), "{\"a\": 1}");
    }

    #[test]
    fn unwraps_fence_without_language_tag() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(sanitize_response(raw), "{\"a\": 1}");
    }

    #[test]
    fn strips_leading_fence_when_closer_missing() {
        let raw = "```json\n{\"a\": 1}";
        assert_eq!(sanitize_response(raw), "{\"a\": 1}");
    }

    #[test]
    fn strips_trailing_fence_when_opener_missing() {
        let raw = "{\"a\": 1}\n```";
        assert_eq!(sanitize_response(raw), "{\"a\": 1}");
    }

    #[test]
    fn balances_missing_closing_braces() {
        let raw = "{\"a\": {\"b\": {\"c\": 1}";
        let out = sanitize_response(raw);
        assert_eq!(out.matches('{').count(), out.matches('}').count());
        assert!(out.starts_with("{\"a\": {\"b\": {\"c\": 1}"));
    }

    #[test]
    fn fenced_and_truncated_response_repairs_both() {
        let raw = "```json\n{\"a\": {\"b\": 1\n```";
        let out = sanitize_response(raw);
        assert_eq!(out.matches('{').count(), out.matches('}').count());
        // Content before the truncation point is untouched.
        assert!(out.starts_with("{\"a\": {\"b\": 1"));
    }

    #[test]
    fn closes_unterminated_trailing_string() {
        let raw = "{\"History\": \"The patient reports";
        let out = sanitize_response(raw);
        assert!(out.contains("reports\""));
        assert_eq!(out.matches('{').count(), out.matches('}').count());
    }

    #[test]
    fn balanced_input_passes_through() {
        let raw = "{\"a\": \"b\"}";
        assert_eq!(sanitize_response(raw), raw);
    }

    #[test]
    fn sanitize_is_idempotent() {
        for raw in [
            "```json\n{\"a\": 1}\n```",
            "{\"a\": {\"b\": 1",
            "{\"k\": \"open value",
        ] {
            let once = sanitize_response(raw);
            assert_eq!(sanitize_response(&once), once);
        }
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(sanitize_response("  {\"a\": 1}  \n"), "{\"a\": 1}");
    }
}
