//! Two-stage parse pipeline and envelope extraction.
//!
//! Strict parse first; on failure, the lenient repair parser. The outcome is
//! a tagged value rather than exception-driven branching so the loop's state
//! machine stays explicit. Envelope extraction then pulls the two required
//! top-level fields out of the parsed value.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::repair;

/// Key the model uses to echo the complaint back.
pub const COMPLAINT_KEY: &str = "Presenting complaint";
/// Key holding the case payload.
pub const CASE_KEY: &str = "case";

/// Result of the strict-then-repair parse.
#[derive(Debug)]
pub enum ParseOutcome {
    /// Strict parse succeeded.
    Parsed(Value),
    /// Strict parse failed; the repair parser produced a value.
    Repaired(Value),
    /// Both stages failed.
    Failed(ParseFailure),
}

/// Diagnostics for a text neither stage could parse.
#[derive(Debug)]
pub struct ParseFailure {
    pub strict_error: String,
    pub repair_error: String,
    /// Text surrounding the strict parse error position.
    pub excerpt: String,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "strict: {}; repair: {}; near '...{}...'",
            self.strict_error, self.repair_error, self.excerpt
        )
    }
}

/// Parse sanitized response text, strictly first, then leniently.
pub fn parse_case_text(text: &str) -> ParseOutcome {
    let strict_error = match serde_json::from_str::<Value>(text) {
        Ok(value) => return ParseOutcome::Parsed(value),
        Err(e) => e,
    };

    tracing::debug!(error = %strict_error, "strict parse failed, attempting repair");

    match repair::repair_json(text) {
        Ok(value) => ParseOutcome::Repaired(value),
        Err(repair_error) => ParseOutcome::Failed(ParseFailure {
            excerpt: excerpt_around(text, &strict_error),
            strict_error: strict_error.to_string(),
            repair_error: repair_error.to_string(),
        }),
    }
}

/// Slice the text around a strict parse error position (±30 chars) for logs.
fn excerpt_around(text: &str, error: &serde_json::Error) -> String {
    let mut offset = 0;
    for (i, line) in text.lines().enumerate() {
        if i + 1 == error.line() {
            offset += error.column().saturating_sub(1);
            break;
        }
        offset += line.len() + 1;
    }
    let chars: Vec<char> = text.chars().collect();
    let pos = offset.min(chars.len());
    let start = pos.saturating_sub(30);
    let end = (pos + 30).min(chars.len());
    chars[start..end].iter().collect()
}

/// The two required top-level fields of a generated response.
#[derive(Debug)]
pub struct CaseEnvelope {
    /// The complaint string as echoed by the model. Audit only; filing
    /// always uses the intended complaint.
    pub reported_complaint: String,
    /// The case payload, validated downstream.
    pub content: Map<String, Value>,
}

#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("expected a single object, got an array of {0} elements")]
    AmbiguousArray(usize),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("missing, empty, or non-string '{COMPLAINT_KEY}' field")]
    MissingComplaint,

    #[error("missing or non-object '{CASE_KEY}' field")]
    MissingCase,
}

/// Extract the envelope from a parsed value. A single-element array is
/// unwrapped; a multi-element array is ambiguous and rejected outright —
/// there is no record selection heuristic.
pub fn extract_envelope(value: Value) -> Result<CaseEnvelope, EnvelopeError> {
    let value = match value {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        Value::Array(items) => return Err(EnvelopeError::AmbiguousArray(items.len())),
        other => other,
    };

    let mut object = match value {
        Value::Object(map) => map,
        other => return Err(EnvelopeError::NotAnObject(json_type_name(&other))),
    };

    let reported_complaint = match object.get(COMPLAINT_KEY) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return Err(EnvelopeError::MissingComplaint),
    };

    let content = match object.remove(CASE_KEY) {
        Some(Value::Object(map)) => map,
        _ => return Err(EnvelopeError::MissingCase),
    };

    Ok(CaseEnvelope {
        reported_complaint,
        content,
    })
}

/// Human-readable JSON type name for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
