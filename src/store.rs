//! Durable, resumable persistence for accepted cases and failures.
//!
//! Layout under the output root:
//! - `<complaint>/<diagnosis>.json` — one accepted payload, pretty-printed
//! - `<complaint>/failed_differentials.jsonl` — one failed name per line
//! - `<complaint>_all_cases.jsonl` — per-complaint aggregate dataset
//! - `all_cases.jsonl` — global aggregate dataset
//! - `raw_responses/`, `debug_prompts/`, `fixed_json_originals/` — audit trail
//!
//! Aggregates are rewritten by the primary pass and appended to by the
//! resumption pass; readers must tolerate both regimes. No write ever
//! removes another diagnosis's file.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::{FAILED_LOG_NAME, GLOBAL_AGGREGATE_NAME};
use crate::error::StoreError;
use crate::normalize;

const RAW_RESPONSES_DIR: &str = "raw_responses";
const DEBUG_PROMPTS_DIR: &str = "debug_prompts";
const REPAIRED_DIR: &str = "fixed_json_originals";

/// One accepted record. Immutable once created; only ever appended to
/// stores. `reported_complaint` is what the model echoed back — audit only,
/// never used for filing.
#[derive(Debug, Clone)]
pub struct GeneratedCase {
    pub intended_complaint: String,
    pub reported_complaint: String,
    pub diagnosis: String,
    pub tag: String,
    /// The case payload with the `tag` field already stamped in.
    pub content: Map<String, Value>,
}

/// Case store service owning the output root.
pub struct CaseStore {
    root: PathBuf,
    cases: Vec<GeneratedCase>,
}

impl CaseStore {
    /// Open (and create if needed) the output root. An unwritable root is a
    /// configuration failure and aborts the run.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io(&root, e))?;
        Ok(Self {
            root,
            cases: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn complaint_dir(&self, complaint: &str) -> PathBuf {
        self.root.join(normalize::sanitize_filename(complaint))
    }

    fn aggregate_path(&self, complaint: &str) -> PathBuf {
        self.root.join(format!(
            "{}_all_cases.jsonl",
            normalize::sanitize_filename(complaint)
        ))
    }

    fn failures_path(&self, complaint: &str) -> PathBuf {
        self.complaint_dir(complaint).join(FAILED_LOG_NAME)
    }

    /// Write one accepted case to its per-diagnosis file and keep it for
    /// aggregate queries. Returns the file path written.
    pub fn write_case(&mut self, case: GeneratedCase) -> Result<PathBuf, StoreError> {
        let dir = self.complaint_dir(&case.intended_complaint);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let path = dir.join(format!("{}.json", normalize::sanitize_filename(&case.diagnosis)));
        let pretty = serde_json::to_string_pretty(&Value::Object(case.content.clone()))?;
        fs::write(&path, pretty).map_err(|e| StoreError::io(&path, e))?;

        tracing::info!(
            complaint = %case.intended_complaint,
            diagnosis = %case.diagnosis,
            tag = %case.tag,
            path = %path.display(),
            "case written"
        );
        self.cases.push(case);
        Ok(path)
    }

    /// Accepted cases filed under a complaint (case-insensitive match).
    pub fn query_by_complaint(&self, complaint: &str) -> Vec<&GeneratedCase> {
        self.cases
            .iter()
            .filter(|c| c.intended_complaint.eq_ignore_ascii_case(complaint))
            .collect()
    }

    /// Rewrite the complaint's aggregate dataset from this run's cases.
    /// No-op when the run produced nothing for this complaint.
    pub fn write_complaint_aggregate(&self, complaint: &str) -> Result<usize, StoreError> {
        let cases = self.query_by_complaint(complaint);
        if cases.is_empty() {
            return Ok(0);
        }
        let path = self.aggregate_path(complaint);
        self.write_jsonl(&path, cases.iter().map(|c| &c.content))?;
        Ok(cases.len())
    }

    /// Rewrite the global aggregate dataset from every case this run.
    pub fn write_global_aggregate(&self) -> Result<usize, StoreError> {
        if self.cases.is_empty() {
            return Ok(0);
        }
        let path = self.root.join(GLOBAL_AGGREGATE_NAME);
        self.write_jsonl(&path, self.cases.iter().map(|c| &c.content))?;
        Ok(self.cases.len())
    }

    fn write_jsonl<'a>(
        &self,
        path: &Path,
        payloads: impl Iterator<Item = &'a Map<String, Value>>,
    ) -> Result<(), StoreError> {
        let mut file = File::create(path).map_err(|e| StoreError::io(path, e))?;
        for payload in payloads {
            let line = serde_json::to_string(payload)?;
            writeln!(file, "{line}").map_err(|e| StoreError::io(path, e))?;
        }
        Ok(())
    }

    /// Resumption regime: append one payload to the complaint's aggregate
    /// and to the global aggregate.
    pub fn append_to_aggregates(
        &self,
        complaint: &str,
        content: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let line = serde_json::to_string(content)?;
        for path in [
            self.aggregate_path(complaint),
            self.root.join(GLOBAL_AGGREGATE_NAME),
        ] {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| StoreError::io(&path, e))?;
            writeln!(file, "{line}").map_err(|e| StoreError::io(&path, e))?;
        }
        Ok(())
    }

    /// Append one failed diagnosis to the complaint's failure log. Not an
    /// error record — a resumable work marker.
    pub fn append_failure(&self, complaint: &str, diagnosis: &str) -> Result<(), StoreError> {
        let dir = self.complaint_dir(complaint);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let path = self.failures_path(complaint);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        let line = serde_json::to_string(diagnosis)?;
        writeln!(file, "{line}").map_err(|e| StoreError::io(&path, e))?;
        tracing::info!(complaint = %complaint, diagnosis = %diagnosis, "failure logged");
        Ok(())
    }

    /// Whether the complaint has a failure log at all. Distinct from an
    /// empty log: an absent log makes the resumption pass fall back to the
    /// taxonomy's full diagnosis list.
    pub fn has_failure_log(&self, complaint: &str) -> bool {
        self.failures_path(complaint).exists()
    }

    /// Read the complaint's failure log. Absent log means no outstanding
    /// failures.
    pub fn read_failures(&self, complaint: &str) -> Result<Vec<String>, StoreError> {
        let path = self.failures_path(complaint);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        let mut names = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| StoreError::io(&path, e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            // Lines are JSON strings, but tolerate bare names.
            let name = serde_json::from_str::<String>(trimmed)
                .unwrap_or_else(|_| trimmed.trim_matches('"').to_string());
            names.push(name);
        }
        Ok(names)
    }

    /// Overwrite the failure log with only the still-unresolved diagnoses.
    pub fn rewrite_failures(&self, complaint: &str, remaining: &[String]) -> Result<(), StoreError> {
        let dir = self.complaint_dir(complaint);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let path = self.failures_path(complaint);
        let mut file = File::create(&path).map_err(|e| StoreError::io(&path, e))?;
        for name in remaining {
            let line = serde_json::to_string(name)?;
            writeln!(file, "{line}").map_err(|e| StoreError::io(&path, e))?;
        }
        Ok(())
    }

    /// Fold the complaint's per-diagnosis files already on disk into the
    /// in-memory case set, so rewrite-regime aggregates keep prior runs'
    /// cases across a restart. Unparseable files are left out with a
    /// warning; they never held an accepted case.
    pub fn absorb_existing_cases(&mut self, complaint: &str) -> Result<usize, StoreError> {
        let dir = self.complaint_dir(complaint);
        let entries = match fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StoreError::io(&dir, e)),
        };

        let mut absorbed = 0;
        for entry in entries.flatten() {
            let filename = entry.file_name();
            let filename = filename.to_string_lossy();
            let Some(base) = filename.strip_suffix(".json") else {
                continue;
            };
            let path = entry.path();
            let text = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
            let content = match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    tracing::warn!(path = %path.display(), "not a case object, left out of aggregates");
                    continue;
                }
            };
            let tag = content
                .get("tag")
                .and_then(Value::as_str)
                .unwrap_or(crate::taxonomy::UNKNOWN_TAG)
                .to_string();
            self.cases.push(GeneratedCase {
                intended_complaint: complaint.to_string(),
                reported_complaint: complaint.to_string(),
                diagnosis: normalize::strip_numbered_suffix(base).to_string(),
                tag,
                content,
            });
            absorbed += 1;
        }
        Ok(absorbed)
    }

    /// Normalized forms of every per-diagnosis file already on disk for a
    /// complaint, with numbered-duplicate suffixes stripped. Used to skip
    /// already-materialized work items.
    pub fn existing_case_names(&self, complaint: &str) -> HashSet<String> {
        let dir = self.complaint_dir(complaint);
        let mut names = HashSet::new();
        let entries = match fs::read_dir(&dir) {
            Ok(e) => e,
            Err(_) => return names,
        };
        for entry in entries.flatten() {
            let filename = entry.file_name();
            let filename = filename.to_string_lossy();
            if let Some(base) = filename.strip_suffix(".json") {
                let base = normalize::strip_numbered_suffix(base);
                names.extend(normalize::all_normalized_forms(base));
            }
        }
        names
    }

    /// Normalized `Correct_Diagnosis` values already present in the
    /// complaint's aggregate dataset. Tolerates payloads with the diagnosis
    /// at the root, under `OSCE_Examination`, or under a full envelope.
    pub fn aggregate_diagnoses(&self, complaint: &str) -> HashSet<String> {
        let path = self.aggregate_path(complaint);
        let mut found = HashSet::new();
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(_) => return found,
        };
        for line in BufReader::new(file).lines().map_while(Result::ok) {
            let value: Value = match serde_json::from_str(&line) {
                Ok(v) => v,
                Err(_) => continue,
            };
            let diagnosis = value
                .get("Correct_Diagnosis")
                .or_else(|| value.pointer("/OSCE_Examination/Correct_Diagnosis"))
                .or_else(|| value.pointer("/case/OSCE_Examination/Correct_Diagnosis"))
                .and_then(Value::as_str);
            if let Some(d) = diagnosis {
                found.insert(normalize::normalize(d));
            }
        }
        found
    }

    /// Complaint directories under the output root. Hidden directories and
    /// the debug-artifact directories are not complaints.
    pub fn list_complaint_dirs(&self) -> Result<Vec<String>, StoreError> {
        let mut dirs = Vec::new();
        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.')
                || matches!(name.as_str(), RAW_RESPONSES_DIR | DEBUG_PROMPTS_DIR | REPAIRED_DIR)
            {
                continue;
            }
            dirs.push(name);
        }
        dirs.sort();
        Ok(dirs)
    }

    // ── Debug audit trail (best-effort, never fails the run) ──

    fn debug_write(&self, dir: &str, filename: &str, contents: &str) {
        let dir = self.root.join(dir);
        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!(path = %dir.display(), error = %e, "cannot create debug dir");
            return;
        }
        let path = dir.join(filename);
        if let Err(e) = fs::write(&path, contents) {
            tracing::warn!(path = %path.display(), error = %e, "cannot write debug file");
        }
    }

    fn debug_filename(complaint: &str, diagnosis: &str, attempt: u32, ext: &str) -> String {
        format!(
            "{}__{}_attempt{}.{}",
            normalize::sanitize_filename(complaint),
            normalize::sanitize_filename(diagnosis),
            attempt,
            ext
        )
    }

    /// Archive the complete raw model response for an attempt.
    pub fn save_raw_response(&self, complaint: &str, diagnosis: &str, attempt: u32, text: &str) {
        let name = Self::debug_filename(complaint, diagnosis, attempt, "txt");
        self.debug_write(RAW_RESPONSES_DIR, &name, text);
    }

    /// Archive the prompt that led to an empty or invalid response.
    pub fn save_debug_prompt(&self, complaint: &str, diagnosis: &str, attempt: u32, prompt: &str) {
        let name = Self::debug_filename(complaint, diagnosis, attempt, "txt");
        self.debug_write(DEBUG_PROMPTS_DIR, &name, prompt);
    }

    /// Archive a repair-parsed value before envelope extraction.
    pub fn save_repaired_original(
        &self,
        complaint: &str,
        diagnosis: &str,
        attempt: u32,
        value: &Value,
    ) {
        let name = format!(
            "{}__{}_attempt{}_repaired_original.json",
            normalize::sanitize_filename(complaint),
            normalize::sanitize_filename(diagnosis),
            attempt
        );
        let pretty = match serde_json::to_string_pretty(value) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "cannot serialize repaired value for archive");
                return;
            }
        };
        self.debug_write(REPAIRED_DIR, &name, &pretty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(diagnosis: &str) -> Map<String, Value> {
        match json!({
            "OSCE_Examination": {
                "Patient_Actor": {},
                "Physical_Examination_Findings": {},
                "Test_Results": {},
                "Correct_Diagnosis": diagnosis
            },
            "tag": "Probability diagnosis"
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn case(complaint: &str, diagnosis: &str) -> GeneratedCase {
        GeneratedCase {
            intended_complaint: complaint.to_string(),
            reported_complaint: complaint.to_string(),
            diagnosis: diagnosis.to_string(),
            tag: "Probability diagnosis".to_string(),
            content: payload(diagnosis),
        }
    }

    #[test]
    fn write_case_creates_per_diagnosis_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CaseStore::open(dir.path()).unwrap();
        let path = store.write_case(case("Headache", "Migraine")).unwrap();
        assert!(path.ends_with("Headache/Migraine.json"));
        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["OSCE_Examination"]["Correct_Diagnosis"], json!("Migraine"));
        assert_eq!(written["tag"], json!("Probability diagnosis"));
    }

    #[test]
    fn filenames_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CaseStore::open(dir.path()).unwrap();
        let path = store
            .write_case(case("Abdominal pain: acute", "Crohn's disease?"))
            .unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name, "Crohn's disease_.json");
        assert!(path.parent().unwrap().ends_with("Abdominal pain_ acute"));
    }

    #[test]
    fn aggregates_are_rewritten_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CaseStore::open(dir.path()).unwrap();
        store.write_case(case("Headache", "Migraine")).unwrap();
        store.write_case(case("Headache", "Tension headache")).unwrap();
        store.write_case(case("Cough", "Pertussis")).unwrap();

        assert_eq!(store.write_complaint_aggregate("Headache").unwrap(), 2);
        assert_eq!(store.write_global_aggregate().unwrap(), 3);

        let per = fs::read_to_string(dir.path().join("Headache_all_cases.jsonl")).unwrap();
        assert_eq!(per.lines().count(), 2);
        let all = fs::read_to_string(dir.path().join("all_cases.jsonl")).unwrap();
        assert_eq!(all.lines().count(), 3);
    }

    #[test]
    fn empty_complaint_aggregate_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaseStore::open(dir.path()).unwrap();
        assert_eq!(store.write_complaint_aggregate("Headache").unwrap(), 0);
        assert!(!dir.path().join("Headache_all_cases.jsonl").exists());
    }

    #[test]
    fn resumption_appends_to_both_aggregates() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CaseStore::open(dir.path()).unwrap();
        store.write_case(case("Headache", "Migraine")).unwrap();
        store.write_complaint_aggregate("Headache").unwrap();
        store.write_global_aggregate().unwrap();

        store
            .append_to_aggregates("Headache", &payload("Cluster headache"))
            .unwrap();

        let per = fs::read_to_string(dir.path().join("Headache_all_cases.jsonl")).unwrap();
        assert_eq!(per.lines().count(), 2);
        let all = fs::read_to_string(dir.path().join("all_cases.jsonl")).unwrap();
        assert_eq!(all.lines().count(), 2);
    }

    #[test]
    fn failure_log_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaseStore::open(dir.path()).unwrap();
        store.append_failure("Headache", "Migraine").unwrap();
        store.append_failure("Headache", "SAH (subarachnoid)").unwrap();
        assert_eq!(
            store.read_failures("Headache").unwrap(),
            vec!["Migraine", "SAH (subarachnoid)"]
        );

        store
            .rewrite_failures("Headache", &["Migraine".to_string()])
            .unwrap();
        assert_eq!(store.read_failures("Headache").unwrap(), vec!["Migraine"]);
    }

    #[test]
    fn read_failures_tolerates_bare_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaseStore::open(dir.path()).unwrap();
        let complaint_dir = dir.path().join("Headache");
        fs::create_dir_all(&complaint_dir).unwrap();
        fs::write(
            complaint_dir.join(FAILED_LOG_NAME),
            "\"Quoted name\"\nBare name\n\n",
        )
        .unwrap();
        assert_eq!(
            store.read_failures("Headache").unwrap(),
            vec!["Quoted name", "Bare name"]
        );
    }

    #[test]
    fn missing_failure_log_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaseStore::open(dir.path()).unwrap();
        assert!(store.read_failures("Headache").unwrap().is_empty());
    }

    #[test]
    fn absorbed_cases_survive_aggregate_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = CaseStore::open(dir.path()).unwrap();
            store.write_case(case("Headache", "Migraine")).unwrap();
        }

        // A fresh store folds the prior file back in before rewriting.
        let mut store = CaseStore::open(dir.path()).unwrap();
        assert_eq!(store.absorb_existing_cases("Headache").unwrap(), 1);
        store.write_case(case("Headache", "Tension headache")).unwrap();
        assert_eq!(store.write_complaint_aggregate("Headache").unwrap(), 2);

        let per = fs::read_to_string(dir.path().join("Headache_all_cases.jsonl")).unwrap();
        assert_eq!(per.lines().count(), 2);
        assert!(per.contains("Migraine"));
        let absorbed = &store.query_by_complaint("Headache")[0];
        assert_eq!(absorbed.tag, "Probability diagnosis");
    }

    #[test]
    fn absorb_ignores_logs_and_non_object_files() {
        let dir = tempfile::tempdir().unwrap();
        let complaint_dir = dir.path().join("Headache");
        fs::create_dir_all(&complaint_dir).unwrap();
        fs::write(complaint_dir.join(FAILED_LOG_NAME), "\"Migraine\"\n").unwrap();
        fs::write(complaint_dir.join("Odd.json"), "[1, 2]").unwrap();

        let mut store = CaseStore::open(dir.path()).unwrap();
        assert_eq!(store.absorb_existing_cases("Headache").unwrap(), 0);
    }

    #[test]
    fn absorb_on_missing_dir_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CaseStore::open(dir.path()).unwrap();
        assert_eq!(store.absorb_existing_cases("Headache").unwrap(), 0);
    }

    #[test]
    fn existing_case_names_normalize_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CaseStore::open(dir.path()).unwrap();
        store.write_case(case("Headache", "Acute appendicitis")).unwrap();

        let names = store.existing_case_names("Headache");
        assert!(names.contains("acute_appendicitis"));
    }

    #[test]
    fn existing_case_names_strip_numbered_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaseStore::open(dir.path()).unwrap();
        let complaint_dir = dir.path().join("Headache");
        fs::create_dir_all(&complaint_dir).unwrap();
        fs::write(complaint_dir.join("Migraine (2).json"), "{}").unwrap();

        let names = store.existing_case_names("Headache");
        assert!(names.contains("migraine"));
    }

    #[test]
    fn aggregate_diagnoses_reads_all_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaseStore::open(dir.path()).unwrap();
        fs::write(
            dir.path().join("Headache_all_cases.jsonl"),
            concat!(
                r#"{"Correct_Diagnosis": "Root level"}"#,
                "\n",
                r#"{"OSCE_Examination": {"Correct_Diagnosis": "Nested level"}}"#,
                "\n",
                r#"{"case": {"OSCE_Examination": {"Correct_Diagnosis": "Envelope level"}}}"#,
                "\n",
                "not json\n",
            ),
        )
        .unwrap();

        let found = store.aggregate_diagnoses("Headache");
        assert!(found.contains("root_level"));
        assert!(found.contains("nested_level"));
        assert!(found.contains("envelope_level"));
    }

    #[test]
    fn list_complaint_dirs_skips_debug_and_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CaseStore::open(dir.path()).unwrap();
        store.write_case(case("Headache", "Migraine")).unwrap();
        store.save_raw_response("Headache", "Migraine", 1, "raw");
        fs::create_dir_all(dir.path().join(".hidden")).unwrap();

        assert_eq!(store.list_complaint_dirs().unwrap(), vec!["Headache"]);
    }

    #[test]
    fn debug_artifacts_are_named_by_work_item_and_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaseStore::open(dir.path()).unwrap();
        store.save_raw_response("Headache", "Migraine", 2, "raw text");
        store.save_debug_prompt("Headache", "Migraine", 2, "prompt text");
        store.save_repaired_original("Headache", "Migraine", 2, &json!({"a": 1}));

        assert!(dir
            .path()
            .join("raw_responses/Headache__Migraine_attempt2.txt")
            .exists());
        assert!(dir
            .path()
            .join("debug_prompts/Headache__Migraine_attempt2.txt")
            .exists());
        assert!(dir
            .path()
            .join("fixed_json_originals/Headache__Migraine_attempt2_repaired_original.json")
            .exists());
    }

    #[test]
    fn stored_payload_revalidates_after_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CaseStore::open(dir.path()).unwrap();
        let path = store.write_case(case("Headache", "Migraine")).unwrap();

        let reread: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        let content = reread.as_object().unwrap();
        assert!(crate::validate::validate_case(content).is_ok());
    }
}
