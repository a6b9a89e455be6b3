//! The generation-validation-repair loop.
//!
//! Each work item — one (complaint, diagnosis) pair — moves through
//! `PENDING → ATTEMPTING → {ACCEPTED, EXHAUSTED}`. An attempt is consumed by
//! any failure along generate → sanitize → parse → envelope → validate; no
//! step is retried in isolation. Processing is strictly sequential: one work
//! item fully resolves before the next begins, so restartability comes from
//! on-disk state, not locking.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::config;
use crate::model::{CaseModel, ModelError, SamplingOptions};
use crate::normalize;
use crate::parse::{self, EnvelopeError, ParseOutcome};
use crate::prompt;
use crate::sanitize;
use crate::store::{CaseStore, GeneratedCase};
use crate::taxonomy::ComplaintTaxonomy;
use crate::validate::{self, ValidationError};

/// Why a single attempt was consumed without producing a case.
#[derive(Debug)]
enum AttemptFailure {
    Transport(ModelError),
    EmptyResponse,
    Parse(String),
    Envelope(EnvelopeError),
    Structure(ValidationError),
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptFailure::Transport(e) => write!(f, "transport error: {e}"),
            AttemptFailure::EmptyResponse => write!(f, "empty response"),
            AttemptFailure::Parse(e) => write!(f, "unparseable response: {e}"),
            AttemptFailure::Envelope(e) => write!(f, "envelope rejected: {e}"),
            AttemptFailure::Structure(e) => write!(f, "structure rejected: {e}"),
        }
    }
}

/// Terminal state of one work item.
#[derive(Debug)]
pub enum WorkOutcome {
    Accepted,
    Exhausted,
    /// A case for this diagnosis already exists; nothing was attempted.
    AlreadySatisfied,
}

/// An accepted response before filing: the tagged payload plus the
/// complaint string the model echoed back.
pub struct AcceptedCase {
    pub reported_complaint: String,
    pub content: Map<String, Value>,
}

/// Run bounded generation attempts for one work item. Returns the accepted
/// case, or `None` once `max_attempts` are exhausted. The `tag` is stamped
/// into the payload on acceptance.
pub fn resolve_work_item<M: CaseModel>(
    model: &M,
    store: &CaseStore,
    complaint: &str,
    diagnosis: &str,
    tag: &str,
    max_attempts: u32,
    backoff: Duration,
) -> Option<AcceptedCase> {
    let prompt = prompt::build_case_prompt(complaint, diagnosis);
    let options = SamplingOptions::default();

    for attempt in 1..=max_attempts {
        tracing::info!(complaint, diagnosis, attempt, max_attempts, "generation attempt");
        match run_attempt(model, store, complaint, diagnosis, &prompt, &options, attempt) {
            Ok(mut accepted) => {
                accepted
                    .content
                    .insert("tag".to_string(), Value::String(tag.to_string()));
                return Some(accepted);
            }
            Err(failure) => {
                tracing::warn!(complaint, diagnosis, attempt, %failure, "attempt failed");
                if let AttemptFailure::EmptyResponse = failure {
                    store.save_debug_prompt(complaint, diagnosis, attempt, &prompt);
                }
                if let AttemptFailure::Transport(_) = failure {
                    std::thread::sleep(backoff);
                }
            }
        }
    }
    None
}

/// One attempt: generate, archive, sanitize, parse, extract, validate.
fn run_attempt<M: CaseModel>(
    model: &M,
    store: &CaseStore,
    complaint: &str,
    diagnosis: &str,
    prompt: &str,
    options: &SamplingOptions,
    attempt: u32,
) -> Result<AcceptedCase, AttemptFailure> {
    let raw = model
        .generate(prompt, options)
        .map_err(AttemptFailure::Transport)?;
    if raw.trim().is_empty() {
        return Err(AttemptFailure::EmptyResponse);
    }

    store.save_raw_response(complaint, diagnosis, attempt, &raw);
    let cleaned = sanitize::sanitize_response(&raw);

    let parsed = match parse::parse_case_text(&cleaned) {
        ParseOutcome::Parsed(value) => value,
        ParseOutcome::Repaired(value) => {
            store.save_repaired_original(complaint, diagnosis, attempt, &value);
            value
        }
        ParseOutcome::Failed(failure) => {
            return Err(AttemptFailure::Parse(failure.to_string()));
        }
    };

    let envelope = parse::extract_envelope(parsed).map_err(AttemptFailure::Envelope)?;
    validate::validate_case(&envelope.content).map_err(AttemptFailure::Structure)?;

    Ok(AcceptedCase {
        reported_complaint: envelope.reported_complaint,
        content: envelope.content,
    })
}

/// Attempt budget and transport backoff for one pass.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl LoopConfig {
    pub fn primary() -> Self {
        Self {
            max_attempts: config::MAX_ATTEMPTS_PRIMARY,
            backoff: config::TRANSPORT_BACKOFF,
        }
    }

    pub fn resumption() -> Self {
        Self {
            max_attempts: config::MAX_ATTEMPTS_RETRY,
            backoff: config::TRANSPORT_BACKOFF,
        }
    }
}

/// Totals for one primary pass.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub complaints: usize,
    pub accepted: usize,
    pub exhausted: usize,
    pub skipped: usize,
}

/// The primary generation pass over a loaded taxonomy.
pub struct GenerationRunner<'a, M: CaseModel> {
    model: &'a M,
    taxonomy: &'a ComplaintTaxonomy,
    store: &'a mut CaseStore,
    /// Per-complaint cap on work items; 0 means no cap.
    max_cases_per_complaint: usize,
    loop_config: LoopConfig,
}

impl<'a, M: CaseModel> GenerationRunner<'a, M> {
    pub fn new(
        model: &'a M,
        taxonomy: &'a ComplaintTaxonomy,
        store: &'a mut CaseStore,
        max_cases_per_complaint: usize,
        loop_config: LoopConfig,
    ) -> Self {
        Self {
            model,
            taxonomy,
            store,
            max_cases_per_complaint,
            loop_config,
        }
    }

    /// Process every complaint sequentially, then write the aggregates.
    pub fn run(&mut self) -> Result<RunSummary, crate::error::StoreError> {
        let mut summary = RunSummary::default();

        for entry in self.taxonomy.entries() {
            summary.complaints += 1;
            tracing::info!(
                complaint = %entry.name,
                differentials = entry.diagnoses.len(),
                "processing complaint"
            );

            // Resumability: anything already materialized on disk is done,
            // and stays in the rewritten aggregates.
            let absorbed = self.store.absorb_existing_cases(&entry.name)?;
            if absorbed > 0 {
                tracing::info!(
                    complaint = %entry.name,
                    cases = absorbed,
                    "prior cases kept for aggregates"
                );
            }
            let mut satisfied = self.store.existing_case_names(&entry.name);

            let cap = if self.max_cases_per_complaint == 0 {
                entry.diagnoses.len()
            } else {
                self.max_cases_per_complaint.min(entry.diagnoses.len())
            };

            for diagnosis in &entry.diagnoses[..cap] {
                match self.resolve(&entry.name, diagnosis, &mut satisfied)? {
                    WorkOutcome::Accepted => summary.accepted += 1,
                    WorkOutcome::Exhausted => summary.exhausted += 1,
                    WorkOutcome::AlreadySatisfied => summary.skipped += 1,
                }
            }

            let written = self.store.write_complaint_aggregate(&entry.name)?;
            if written > 0 {
                tracing::info!(complaint = %entry.name, cases = written, "aggregate written");
            }
        }

        let total = self.store.write_global_aggregate()?;
        tracing::info!(
            complaints = summary.complaints,
            accepted = summary.accepted,
            exhausted = summary.exhausted,
            skipped = summary.skipped,
            total,
            "run complete"
        );
        Ok(summary)
    }

    fn resolve(
        &mut self,
        complaint: &str,
        diagnosis: &str,
        satisfied: &mut std::collections::HashSet<String>,
    ) -> Result<WorkOutcome, crate::error::StoreError> {
        let forms = normalize::all_normalized_forms(diagnosis);
        if forms.iter().any(|f| satisfied.contains(f)) {
            tracing::info!(complaint, diagnosis, "skipping, already generated");
            return Ok(WorkOutcome::AlreadySatisfied);
        }

        let tag = self.taxonomy.tag_for(complaint, diagnosis);
        let accepted = resolve_work_item(
            self.model,
            self.store,
            complaint,
            diagnosis,
            tag,
            self.loop_config.max_attempts,
            self.loop_config.backoff,
        );

        match accepted {
            Some(case) => {
                self.store.write_case(GeneratedCase {
                    intended_complaint: complaint.to_string(),
                    reported_complaint: case.reported_complaint,
                    diagnosis: diagnosis.to_string(),
                    tag: tag.to_string(),
                    content: case.content,
                })?;
                satisfied.extend(forms);
                Ok(WorkOutcome::Accepted)
            }
            None => {
                tracing::warn!(
                    complaint,
                    diagnosis,
                    attempts = self.loop_config.max_attempts,
                    "exhausted all attempts"
                );
                self.store.append_failure(complaint, diagnosis)?;
                Ok(WorkOutcome::Exhausted)
            }
        }
    }
}
