use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::AdvisoryError;

/// Text-generation service seam. One call, one reply; no retries, no
/// streaming. Implementations must be shareable across threads.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, AdvisoryError>;
}

/// Ollama HTTP client for local LLM inference.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new OllamaClient pointing at a local Ollama instance.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default Ollama instance at localhost:11434 with a 2-minute timeout.
    pub fn default_local() -> Self {
        Self::new(
            crate::config::DEFAULT_OLLAMA_URL,
            crate::config::DEFAULT_ADVISORY_TIMEOUT_SECS,
        )
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl TextGenerator for OllamaClient {
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, AdvisoryError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model,
            prompt,
            system,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AdvisoryError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    AdvisoryError::Timeout(self.timeout_secs)
                } else {
                    AdvisoryError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AdvisoryError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| AdvisoryError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Mock text generator for testing — returns a configurable reply and counts
/// how often it was asked.
#[derive(Clone)]
pub struct MockTextGenerator {
    reply: Result<String, String>,
    calls: Arc<AtomicUsize>,
}

impl MockTextGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A generator whose every call fails with a connection error.
    pub fn failing() -> Self {
        Self {
            reply: Err("http://localhost:11434".to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextGenerator for MockTextGenerator {
    fn generate(&self, _model: &str, _prompt: &str, _system: &str) -> Result<String, AdvisoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(url) => Err(AdvisoryError::Connection(url.clone())),
        }
    }
}
