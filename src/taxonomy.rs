//! Complaint → differential taxonomy loading.
//!
//! Source is line-delimited JSON, one object per line:
//! `{ "Headache": { "Probability diagnosis": ["Migraine", ...], ... } }`.
//! Malformed lines are skipped with a diagnostic; a missing or unreadable
//! source yields an empty taxonomy, never a panic — the caller decides
//! whether "nothing loaded" is fatal.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::config::EXCLUDED_CATEGORIES;
use crate::normalize;

/// Sentinel category for diagnoses without a tag index entry.
pub const UNKNOWN_TAG: &str = "Unknown";

/// One complaint with its ordered, deduplicated differential list.
#[derive(Debug, Clone)]
pub struct ComplaintEntry {
    pub name: String,
    pub diagnoses: Vec<String>,
}

/// The full taxonomy, in source-file order, plus the diagnosis→category
/// tag index keyed by normalized names.
#[derive(Debug, Default)]
pub struct ComplaintTaxonomy {
    entries: Vec<ComplaintEntry>,
    tags: HashMap<String, HashMap<String, String>>,
}

impl ComplaintTaxonomy {
    /// Load from a line-delimited JSON file. Never fails: IO problems and
    /// malformed lines are logged and produce an empty or partial taxonomy.
    pub fn load(path: &Path) -> Self {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot open taxonomy source");
                return Self::default();
            }
        };

        let mut taxonomy = Self::default();
        for (line_number, line) in BufReader::new(file).lines().enumerate() {
            let line_number = line_number + 1;
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    tracing::warn!(line_number, error = %e, "unreadable taxonomy line, skipping");
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(line.trim()) {
                Ok(value) => taxonomy.ingest_line(value, line_number),
                Err(e) => {
                    tracing::warn!(line_number, error = %e, "malformed taxonomy line, skipping");
                }
            }
        }

        if taxonomy.is_empty() {
            tracing::warn!(path = %path.display(), "no differential diagnoses were loaded");
        }
        taxonomy
    }

    /// Ingest one parsed line. Exactly one top-level key (the complaint),
    /// whose value maps category labels to diagnosis lists.
    fn ingest_line(&mut self, value: Value, line_number: usize) {
        let object = match value {
            Value::Object(map) if map.len() == 1 => map,
            Value::Object(map) => {
                tracing::warn!(
                    line_number,
                    keys = map.len(),
                    "expected a single complaint key per line, skipping"
                );
                return;
            }
            other => {
                tracing::warn!(
                    line_number,
                    found = crate::parse::json_type_name(&other),
                    "expected an object per line, skipping"
                );
                return;
            }
        };

        // Single key asserted above.
        let (complaint, categories) = match object.into_iter().next() {
            Some(pair) => pair,
            None => return,
        };

        let categories = match categories {
            Value::Object(map) => map,
            other => {
                tracing::warn!(
                    line_number,
                    complaint = %complaint,
                    found = crate::parse::json_type_name(&other),
                    "expected a category map for complaint, skipping"
                );
                return;
            }
        };

        let mut diagnoses: Vec<String> = Vec::new();
        let mut tag_map: HashMap<String, String> = HashMap::new();
        for (category, listed) in categories {
            if EXCLUDED_CATEGORIES.contains(&category.as_str()) {
                continue;
            }
            let listed = match listed {
                Value::Array(items) => items,
                _ => continue,
            };
            for item in listed {
                if let Value::String(diagnosis) = item {
                    // First occurrence wins, keeping its original category.
                    if !diagnoses.contains(&diagnosis) {
                        tag_map
                            .entry(normalize::normalize(&diagnosis))
                            .or_insert_with(|| category.clone());
                        diagnoses.push(diagnosis);
                    }
                }
            }
        }

        if diagnoses.is_empty() {
            tracing::warn!(line_number, complaint = %complaint, "no usable diagnoses, omitting complaint");
            return;
        }

        tracing::info!(
            complaint = %complaint,
            diagnoses = diagnoses.len(),
            "loaded differentials"
        );
        self.tags.insert(normalize::normalize(&complaint), tag_map);
        self.entries.push(ComplaintEntry {
            name: complaint,
            diagnoses,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Complaints in source order.
    pub fn entries(&self) -> &[ComplaintEntry] {
        &self.entries
    }

    /// Look up an entry by its normalized complaint name (used by the
    /// resumption pass, which only has sanitized folder names).
    pub fn entry_by_normalized(&self, normalized: &str) -> Option<&ComplaintEntry> {
        self.entries
            .iter()
            .find(|e| normalize::normalize(&e.name) == normalized)
    }

    /// Category tag for a diagnosis under a complaint. Lookup misses are
    /// the `Unknown` sentinel, never an error.
    pub fn tag_for(&self, complaint: &str, diagnosis: &str) -> &str {
        self.tags
            .get(&normalize::normalize(complaint))
            .and_then(|m| m.get(&normalize::normalize(diagnosis)))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_TAG)
    }

    /// Restrict to complaints matching any of the given substrings
    /// (case-insensitive). An empty target list keeps everything.
    pub fn filter_complaints(&mut self, targets: &[String]) {
        if targets.is_empty() {
            return;
        }
        let lowered: Vec<String> = targets.iter().map(|t| t.to_lowercase()).collect();
        for target in targets {
            let matched = self
                .entries
                .iter()
                .any(|e| e.name.to_lowercase().contains(&target.to_lowercase()));
            if matched {
                tracing::info!(target = %target, "matched complaint filter");
            } else {
                tracing::warn!(target = %target, "no complaint matched filter entry");
            }
        }
        self.entries.retain(|entry| {
            let name = entry.name.to_lowercase();
            lowered.iter().any(|t| name.contains(t))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_taxonomy(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        for line in lines {
            writeln!(file, "{line}").expect("write line");
        }
        file
    }

    const HEADACHE_LINE: &str = r#"{"Headache": {"Probability diagnosis": ["Migraine", "Tension headache"], "Masquerades": ["Brain tumour"]}}"#;

    #[test]
    fn excluded_categories_contribute_nothing() {
        let file = write_taxonomy(&[HEADACHE_LINE]);
        let taxonomy = ComplaintTaxonomy::load(file.path());
        let entry = &taxonomy.entries()[0];
        assert_eq!(entry.name, "Headache");
        assert_eq!(entry.diagnoses, vec!["Migraine", "Tension headache"]);
    }

    #[test]
    fn duplicate_diagnosis_keeps_first_category() {
        let line = r#"{"Chest pain": {"Probability diagnosis": ["Angina", "GORD"], "Serious disorders": ["Angina", "Aortic dissection"]}}"#;
        let file = write_taxonomy(&[line]);
        let taxonomy = ComplaintTaxonomy::load(file.path());
        let entry = &taxonomy.entries()[0];
        assert_eq!(entry.diagnoses, vec!["Angina", "GORD", "Aortic dissection"]);
        assert_eq!(taxonomy.tag_for("Chest pain", "Angina"), "Probability diagnosis");
        assert_eq!(
            taxonomy.tag_for("Chest pain", "Aortic dissection"),
            "Serious disorders"
        );
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let file = write_taxonomy(&[
            "not json at all",
            r#"{"Two": {}, "Keys": {}}"#,
            r#"{"Scalar value": 12}"#,
            HEADACHE_LINE,
        ]);
        let taxonomy = ComplaintTaxonomy::load(file.path());
        assert_eq!(taxonomy.entries().len(), 1);
        assert_eq!(taxonomy.entries()[0].name, "Headache");
    }

    #[test]
    fn complaint_with_only_excluded_categories_is_omitted() {
        let line = r#"{"Odd": {"Masquerades": ["Depression"]}}"#;
        let file = write_taxonomy(&[line, HEADACHE_LINE]);
        let taxonomy = ComplaintTaxonomy::load(file.path());
        assert_eq!(taxonomy.entries().len(), 1);
    }

    #[test]
    fn missing_file_yields_empty_taxonomy() {
        let taxonomy = ComplaintTaxonomy::load(Path::new("/nonexistent/diagnoses.jsonl"));
        assert!(taxonomy.is_empty());
    }

    #[test]
    fn unknown_tag_sentinel() {
        let file = write_taxonomy(&[HEADACHE_LINE]);
        let taxonomy = ComplaintTaxonomy::load(file.path());
        assert_eq!(taxonomy.tag_for("Headache", "Never heard of it"), UNKNOWN_TAG);
        assert_eq!(taxonomy.tag_for("No such complaint", "Migraine"), UNKNOWN_TAG);
    }

    #[test]
    fn tag_lookup_survives_name_formatting() {
        let file = write_taxonomy(&[HEADACHE_LINE]);
        let taxonomy = ComplaintTaxonomy::load(file.path());
        assert_eq!(
            taxonomy.tag_for("headache", "tension_headache"),
            "Probability diagnosis"
        );
    }

    #[test]
    fn filter_matches_substring_case_insensitive() {
        let file = write_taxonomy(&[
            HEADACHE_LINE,
            r#"{"Chest pain in adults": {"Probability diagnosis": ["Angina"]}}"#,
            r#"{"Chest pain in children": {"Probability diagnosis": ["Costochondritis"]}}"#,
        ]);
        let mut taxonomy = ComplaintTaxonomy::load(file.path());
        taxonomy.filter_complaints(&["chest pain".to_string()]);
        assert_eq!(taxonomy.entries().len(), 2);
        assert!(taxonomy.entries().iter().all(|e| e.name.contains("Chest pain")));
    }

    #[test]
    fn empty_filter_keeps_all() {
        let file = write_taxonomy(&[HEADACHE_LINE]);
        let mut taxonomy = ComplaintTaxonomy::load(file.path());
        taxonomy.filter_complaints(&[]);
        assert_eq!(taxonomy.entries().len(), 1);
    }

    #[test]
    fn entry_by_normalized_folder_name() {
        let file = write_taxonomy(&[
            r#"{"Abdominal pain, acute in adults": {"Probability diagnosis": ["Appendicitis"]}}"#,
        ]);
        let taxonomy = ComplaintTaxonomy::load(file.path());
        let entry = taxonomy
            .entry_by_normalized("abdominal_pain_acute_in_adults")
            .expect("entry");
        assert_eq!(entry.diagnoses, vec!["Appendicitis"]);
    }
}
