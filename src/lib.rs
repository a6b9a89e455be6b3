//! Synthetic OSCE case generation.
//!
//! The pipeline prompts an unreliable text model for clinical case records,
//! sanitizes and parses the responses (with a lenient repair fallback),
//! validates their structure, and persists accepted cases into a resumable
//! on-disk store. A separate resumption pass re-attempts everything the
//! primary pass gave up on.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod prompt;
pub mod repair;
pub mod retry;
pub mod runner;
pub mod sanitize;
pub mod store;
pub mod taxonomy;
pub mod validate;
