//! Pipeline-level error types.
//!
//! Per-attempt failures (malformed responses, rejected structures) are not
//! errors — they consume attempts inside the loop. These types cover the
//! failures that should stop a run: bad configuration, unusable output
//! directory, unreachable taxonomy.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no diagnoses loaded from taxonomy at {0}")]
    EmptyTaxonomy(PathBuf),

    #[error("no complaints matched the requested filter")]
    NoMatchingComplaints,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
