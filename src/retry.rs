//! The resumption pass: re-attempt previously exhausted work items.
//!
//! Work is reconstructed from the output directory itself, not from run
//! state: every complaint folder is visited, its failure log (or, when the
//! log is absent, the full differential list from the taxonomy) becomes the
//! work list, and anything already materialized on disk or present in the
//! aggregate dataset is skipped. The attempt budget is much larger than the
//! primary pass's, since everything left here has already failed once.

use std::collections::HashSet;

use crate::error::StoreError;
use crate::model::CaseModel;
use crate::normalize;
use crate::runner::{resolve_work_item, LoopConfig};
use crate::store::{CaseStore, GeneratedCase};
use crate::taxonomy::ComplaintTaxonomy;

/// Totals for one resumption pass.
#[derive(Debug, Default)]
pub struct RetrySummary {
    pub complaints: usize,
    pub recovered: usize,
    pub still_failed: usize,
    pub skipped: usize,
}

/// The resumption pass over an existing output directory.
pub struct RetryRunner<'a, M: CaseModel> {
    model: &'a M,
    taxonomy: &'a ComplaintTaxonomy,
    store: &'a mut CaseStore,
    loop_config: LoopConfig,
}

/// Reconstruct a displayable complaint name from a sanitized folder name.
/// Underscores become spaces and each word is capitalized; used only when
/// the folder has no taxonomy match.
fn complaint_from_folder(folder: &str) -> String {
    folder
        .replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl<'a, M: CaseModel> RetryRunner<'a, M> {
    pub fn new(
        model: &'a M,
        taxonomy: &'a ComplaintTaxonomy,
        store: &'a mut CaseStore,
        loop_config: LoopConfig,
    ) -> Self {
        Self {
            model,
            taxonomy,
            store,
            loop_config,
        }
    }

    /// Visit every complaint folder and re-attempt its outstanding items.
    pub fn run(&mut self) -> Result<RetrySummary, StoreError> {
        let mut summary = RetrySummary::default();

        for folder in self.store.list_complaint_dirs()? {
            summary.complaints += 1;
            self.run_complaint(&folder, &mut summary)?;
        }

        tracing::info!(
            complaints = summary.complaints,
            recovered = summary.recovered,
            still_failed = summary.still_failed,
            skipped = summary.skipped,
            "resumption pass complete"
        );
        Ok(summary)
    }

    fn run_complaint(&mut self, folder: &str, summary: &mut RetrySummary) -> Result<(), StoreError> {
        let entry = self.taxonomy.entry_by_normalized(&normalize::normalize(folder));
        let complaint = match entry {
            Some(e) => e.name.clone(),
            None => complaint_from_folder(folder),
        };

        let work = if self.store.has_failure_log(folder) {
            self.store.read_failures(folder)?
        } else if let Some(entry) = entry {
            tracing::info!(
                complaint = %complaint,
                "no failure log, re-checking full differential list"
            );
            entry.diagnoses.clone()
        } else {
            tracing::warn!(
                folder = %folder,
                "no failure log and no taxonomy match, skipping folder"
            );
            return Ok(());
        };

        // Dedup by normalized name, keeping first occurrence order.
        let mut seen = HashSet::new();
        let work: Vec<String> = work
            .into_iter()
            .filter(|d| seen.insert(normalize::normalize(d)))
            .collect();
        if work.is_empty() {
            tracing::info!(complaint = %complaint, "nothing outstanding");
            return Ok(());
        }

        let mut satisfied = self.store.existing_case_names(folder);
        satisfied.extend(self.store.aggregate_diagnoses(folder));

        tracing::info!(
            complaint = %complaint,
            outstanding = work.len(),
            "re-attempting failed differentials"
        );

        let mut still_failed = Vec::new();
        for diagnosis in &work {
            let forms = normalize::all_normalized_forms(diagnosis);
            if forms.iter().any(|f| satisfied.contains(f)) {
                tracing::info!(complaint = %complaint, diagnosis, "already satisfied, skipping");
                summary.skipped += 1;
                continue;
            }

            let tag = self.taxonomy.tag_for(folder, diagnosis).to_string();
            let accepted = resolve_work_item(
                self.model,
                self.store,
                &complaint,
                diagnosis,
                &tag,
                self.loop_config.max_attempts,
                self.loop_config.backoff,
            );

            match accepted {
                Some(case) => {
                    let content = case.content;
                    // File under the existing folder name, not the display
                    // name, so resumption never forks a second directory.
                    self.store.write_case(GeneratedCase {
                        intended_complaint: folder.to_string(),
                        reported_complaint: case.reported_complaint,
                        diagnosis: diagnosis.clone(),
                        tag,
                        content: content.clone(),
                    })?;
                    self.store.append_to_aggregates(folder, &content)?;
                    satisfied.extend(forms);
                    summary.recovered += 1;
                }
                None => {
                    tracing::warn!(
                        complaint = %complaint,
                        diagnosis,
                        attempts = self.loop_config.max_attempts,
                        "still failing after resumption attempts"
                    );
                    still_failed.push(diagnosis.clone());
                    summary.still_failed += 1;
                }
            }
        }

        self.store.rewrite_failures(folder, &still_failed)?;
        Ok(())
    }
}
