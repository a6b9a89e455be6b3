//! Run-level constants and environment-derived settings.

use std::time::Duration;

pub const APP_NAME: &str = "oscegen";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default location of the line-delimited taxonomy source.
pub const DEFAULT_TAXONOMY_PATH: &str = "tables_list/diagnoses.jsonl";

/// Default output root for generated cases.
pub const DEFAULT_OUTPUT_DIR: &str = "artefacts";

/// Taxonomy categories that never contribute diagnoses.
pub const EXCLUDED_CATEGORIES: &[&str] = &["Masquerades", "Patient trying to tell me something"];

/// Per-complaint failure log filename.
pub const FAILED_LOG_NAME: &str = "failed_differentials.jsonl";

/// Global aggregate dataset filename.
pub const GLOBAL_AGGREGATE_NAME: &str = "all_cases.jsonl";

/// Attempt cap for the primary generation pass.
pub const MAX_ATTEMPTS_PRIMARY: u32 = 3;

/// Attempt cap for the resumption pass. Higher on purpose: retried items
/// are already known to be hard.
pub const MAX_ATTEMPTS_RETRY: u32 = 15;

/// Fixed sleep after a transport error before the next attempt.
pub const TRANSPORT_BACKOFF: Duration = Duration::from_secs(2);

/// Complaints to run when no `--complaints` filter is given. Empty means
/// all complaints in the taxonomy. Edit in place for a partial run.
pub const COMPLAINTS_TO_RUN: &[&str] = &[];

/// Default Ollama-compatible endpoint.
pub const DEFAULT_MODEL_BASE_URL: &str = "http://localhost:11434";

/// Default model name for generation.
pub const DEFAULT_MODEL_NAME: &str = "gemma2:27b";

/// Default HTTP timeout for a single generation call, in seconds.
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 300;

/// Model endpoint base URL, overridable via `OSCEGEN_BASE_URL`.
pub fn model_base_url() -> String {
    std::env::var("OSCEGEN_BASE_URL").unwrap_or_else(|_| DEFAULT_MODEL_BASE_URL.to_string())
}

/// Model name, overridable via `OSCEGEN_MODEL`.
pub fn model_name() -> String {
    std::env::var("OSCEGEN_MODEL").unwrap_or_else(|_| DEFAULT_MODEL_NAME.to_string())
}

/// Default log filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    format!("{}=info", APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_cap_exceeds_primary_cap() {
        assert!(MAX_ATTEMPTS_RETRY > MAX_ATTEMPTS_PRIMARY);
    }

    #[test]
    fn excluded_categories_match_taxonomy_labels() {
        assert!(EXCLUDED_CATEGORIES.contains(&"Masquerades"));
        assert!(EXCLUDED_CATEGORIES.contains(&"Patient trying to tell me something"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
