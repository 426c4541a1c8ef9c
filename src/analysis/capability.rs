//! Injected inference capabilities consumed by the pipeline.
//!
//! The pipeline treats summarization and entity recognition as opaque,
//! possibly-failing operations behind these traits. Backends are
//! constructed by the caller and passed in, so the pipeline carries no
//! process-wide inference state and tests can substitute stubs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from an inference capability call.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("api error: {0}")]
    Api(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("capability unavailable: {0}")]
    Unavailable(String),
}

/// Why a single chunk's inference call was skipped.
///
/// A chunk failure never aborts the document; the chunk's contribution
/// is dropped and the failure is counted in the pass statistics.
#[derive(Debug, Error)]
pub enum ChunkFailure {
    #[error("inference call timed out")]
    TimedOut,

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// A (type label, raw value) pair emitted by an entity recognizer.
///
/// Raw values may carry sub-token continuation markers from the
/// backend's tokenizer; the aggregator strips them before merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub label: String,
    pub text: String,
}

impl EntitySpan {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Bounded-input abstractive summarization.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize one chunk of text into roughly `min_words..=max_words` words.
    async fn summarize(
        &self,
        text: &str,
        min_words: usize,
        max_words: usize,
    ) -> Result<String, CapabilityError>;
}

/// Bounded-input named entity recognition.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Extract entity spans from one chunk of text, in document order.
    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, CapabilityError>;
}

/// Extractive fallback summarizer: keeps the leading words of a chunk.
///
/// Used when no LLM backend is available so the pipeline still produces
/// a (crude) summary, and in tests as a deterministic capability.
pub struct LeadSummarizer;

#[async_trait]
impl Summarizer for LeadSummarizer {
    async fn summarize(
        &self,
        text: &str,
        _min_words: usize,
        max_words: usize,
    ) -> Result<String, CapabilityError> {
        let lead: Vec<&str> = text.split_whitespace().take(max_words.max(1)).collect();
        Ok(lead.join(" "))
    }
}
