//! Canonicalization of diagnosis and complaint names.
//!
//! Sources disagree on formatting: taxonomy entries may carry category
//! prefixes ("Serious disorders: ..."), filenames have invalid characters
//! replaced and may carry " (2)" disambiguators, failure logs quote names.
//! Normalized forms make these comparable.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Category prefixes that sometimes leak into diagnosis names. Matched
/// case-insensitively at the start of the string; at most one is stripped.
const CATEGORY_PREFIXES: &[&str] = &[
    "vascular:",
    "infection:",
    "cancer:",
    "other:",
    "rarity:",
    "pulmonary cause:",
    "neoplasia/cancer:",
    "pitfalls:",
    "serious disorders:",
    "probability diagnosis:",
    "masquerades:",
    "patient trying to tell me something:",
    "pitfall:",
    "serious disorder:",
];

static WS_OR_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_]+").expect("valid regex"));
static NON_SNAKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]").expect("valid regex"));
static REPEAT_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("valid regex"));
static NUMBERED_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d+\)$").expect("valid regex"));
static INVALID_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("valid regex"));

/// Strip one recognized category prefix from the start of a name, if present.
/// The prefixes are ASCII, so the comparison is ASCII-case-insensitive over
/// the original bytes; no lowercased copy whose byte offsets could drift.
pub fn strip_category_prefix(name: &str) -> &str {
    for prefix in CATEGORY_PREFIXES {
        if let (Some(head), Some(tail)) = (name.get(..prefix.len()), name.get(prefix.len()..)) {
            if head.eq_ignore_ascii_case(prefix) {
                return tail.trim_start();
            }
        }
    }
    name
}

/// Canonical snake_case form of a diagnosis or complaint name. Idempotent.
pub fn normalize(name: &str) -> String {
    let stripped = strip_category_prefix(name).to_lowercase();
    let collapsed = WS_OR_UNDERSCORE.replace_all(&stripped, "_");
    let cleaned = NON_SNAKE.replace_all(&collapsed, "");
    let deduped = REPEAT_UNDERSCORE.replace_all(&cleaned, "_");
    deduped.trim_matches('_').to_string()
}

/// Every normalized form a name may appear under: the full name and the
/// prefix-stripped name. Tolerates inputs that may or may not already have
/// had a prefix removed.
pub fn all_normalized_forms(name: &str) -> HashSet<String> {
    let mut forms = HashSet::new();
    forms.insert(normalize(name));
    forms.insert(normalize(strip_category_prefix(name)));
    forms
}

/// Remove a trailing parenthesized integer disambiguator, e.g. "Gout (2)".
pub fn strip_numbered_suffix(name: &str) -> &str {
    match NUMBERED_SUFFIX.find(name) {
        Some(m) => &name[..m.start()],
        None => name,
    }
}

/// Replace filesystem-invalid characters with underscores. Windows-invalid
/// set, applied on all platforms for portable output trees.
pub fn sanitize_filename(name: &str) -> String {
    INVALID_FILENAME_CHARS.replace_all(name, "_").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_snakes() {
        assert_eq!(normalize("Acute Appendicitis"), "acute_appendicitis");
    }

    #[test]
    fn normalize_strips_category_prefix() {
        assert_eq!(normalize("Vascular: Mesenteric ischaemia"), "mesenteric_ischaemia");
        assert_eq!(normalize("Serious disorders: Ectopic pregnancy"), "ectopic_pregnancy");
    }

    #[test]
    fn normalize_removes_punctuation() {
        assert_eq!(
            normalize("Crohn's disease (terminal ileitis)"),
            "crohns_disease_terminal_ileitis"
        );
    }

    #[test]
    fn normalize_collapses_underscore_runs() {
        assert_eq!(normalize("a  -  b"), "a_b");
        assert_eq!(normalize("__a___b__"), "a_b");
    }

    #[test]
    fn normalize_is_idempotent() {
        for name in [
            "Acute appendicitis",
            "Vascular: Mesenteric ischaemia",
            "Crohn's disease (terminal ileitis)",
            "  spaced   out  ",
        ] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once, "not idempotent for {name:?}");
        }
    }

    #[test]
    fn all_forms_contains_plain_normalization() {
        for name in ["Migraine", "Cancer: Lymphoma", "weird__name (3)"] {
            assert!(all_normalized_forms(name).contains(&normalize(name)));
        }
    }

    #[test]
    fn all_forms_covers_prefixed_and_stripped() {
        let forms = all_normalized_forms("Infection: Osteomyelitis");
        assert!(forms.contains("osteomyelitis"));
    }

    #[test]
    fn strips_numbered_suffix_only_at_end() {
        assert_eq!(strip_numbered_suffix("Gout (2)"), "Gout");
        assert_eq!(strip_numbered_suffix("Type (2) diabetes"), "Type (2) diabetes");
        assert_eq!(strip_numbered_suffix("Gout"), "Gout");
    }

    #[test]
    fn sanitize_filename_replaces_invalid_chars() {
        assert_eq!(
            sanitize_filename("Abdominal pain, acute: adults?"),
            "Abdominal pain, acute_ adults_"
        );
        assert_eq!(sanitize_filename(r#"a/b\c|d"#), "a_b_c_d");
    }

    #[test]
    fn prefix_strip_is_case_insensitive() {
        assert_eq!(strip_category_prefix("PITFALLS: Giardiasis"), "Giardiasis");
        assert_eq!(strip_category_prefix("No prefix here"), "No prefix here");
    }

    #[test]
    fn prefix_strip_tolerates_non_ascii_names() {
        // Length-shifting lowercase (dotted capital I) must neither panic
        // nor mis-slice; the ASCII prefixes simply do not match.
        assert_eq!(
            strip_category_prefix("İnfection: Osteomyelitis"),
            "İnfection: Osteomyelitis"
        );
        assert_eq!(strip_category_prefix("Cancer: Sjögren syndrome"), "Sjögren syndrome");
        let once = normalize("İnfection: Osteomyelitis");
        assert_eq!(normalize(&once), once);
    }
}
