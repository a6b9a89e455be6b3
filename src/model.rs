//! The generation capability: an abstract "prompt in, text out" collaborator.
//!
//! The pipeline never names a vendor. `CaseModel` is the seam; the shipped
//! implementation talks to an Ollama-compatible `/api/generate` endpoint,
//! and `MockModel` replays scripted responses for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed sampling configuration for case generation.
#[derive(Debug, Clone, Serialize)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_k: u32,
    pub top_p: f32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_output_tokens: 8000,
            top_k: 40,
            top_p: 0.8,
        }
    }
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model endpoint is not reachable at {0}")]
    Connection(String),

    #[error("generation request timed out after {0}s")]
    Timeout(u64),

    #[error("model endpoint returned error (status {status}): {body}")]
    Endpoint { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("response body could not be decoded: {0}")]
    ResponseDecoding(String),
}

/// Text generation capability. Unreliable by contract: implementations may
/// return malformed JSON-ish text, truncate, or fail outright.
pub trait CaseModel {
    fn generate(&self, prompt: &str, options: &SamplingOptions) -> Result<String, ModelError>;
}

/// Blocking HTTP client for an Ollama-compatible generation endpoint.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, ModelError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ModelError::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Ollama option names for the fixed sampling configuration.
#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
    top_k: u32,
    top_p: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl CaseModel for OllamaClient {
    fn generate(&self, prompt: &str, options: &SamplingOptions) -> Result<String, ModelError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: options.temperature,
                num_predict: options.max_output_tokens,
                top_k: options.top_k,
                top_p: options.top_p,
            },
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                ModelError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                ModelError::Timeout(self.timeout_secs)
            } else {
                ModelError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| ModelError::ResponseDecoding(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Scripted model for tests: replays a fixed sequence of responses, then
/// repeats the last one.
pub struct MockModel {
    script: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Option<Result<String, String>>>,
    calls: Mutex<u32>,
}

impl MockModel {
    pub fn new(script: Vec<Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: Mutex::new(0),
        }
    }

    /// A model that always returns the same text.
    pub fn always(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    /// A model that always fails with a transport error.
    pub fn always_failing() -> Self {
        Self::new(vec![Err("connection refused".to_string())])
    }

    /// Number of generate calls made so far.
    pub fn calls(&self) -> u32 {
        *self.calls.lock().expect("mock lock")
    }
}

impl CaseModel for MockModel {
    fn generate(&self, _prompt: &str, _options: &SamplingOptions) -> Result<String, ModelError> {
        *self.calls.lock().expect("mock lock") += 1;
        let mut script = self.script.lock().expect("mock lock");
        let mut last = self.last.lock().expect("mock lock");
        let next = match script.pop_front() {
            Some(entry) => {
                *last = Some(entry.clone());
                entry
            }
            None => last.clone().unwrap_or(Err("script exhausted".to_string())),
        };
        next.map_err(ModelError::Http)
    }
}
