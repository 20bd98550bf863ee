pub mod advisory;
pub mod classify;
pub mod ollama;
pub mod preprocess;
pub mod prompt;

use std::path::PathBuf;

use thiserror::Error;

/// Faults from the advisory side of the pipeline. These never escape the
/// advisory generator (it degrades to placeholder text); they exist so the
/// transport layer can say precisely what went wrong in logs.
#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("Cannot connect to advisory service at {0}. Is Ollama running?")]
    Connection(String),

    #[error("Advisory service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Failed to parse advisory response: {0}")]
    ResponseParsing(String),
}

/// Faults from the slide-classification side of the pipeline. Unlike
/// advisory faults these are surfaced to the caller: a record is never
/// updated on the strength of a failed classification.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Cannot load slide image: {0}")]
    ImageLoad(String),

    #[error("Classifier model not found at {0}")]
    ModelNotFound(PathBuf),

    #[error("Classifier initialization failed: {0}")]
    ModelInit(String),

    #[error("Model inference failed: {0}")]
    ModelInference(String),
}
