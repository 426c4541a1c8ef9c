//! Entity aggregation across chunk boundaries.
//!
//! Every chunk of a document is run through the entity-recognition
//! capability; the raw spans are normalized and merged into a single
//! mapping of entity type to deduplicated value set. Entities that
//! straddle a chunk overlap may surface twice with different fragments;
//! that precision loss is accepted rather than attempting cross-chunk
//! span stitching.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::capability::{ChunkFailure, EntityRecognizer, EntitySpan};
use super::chunker::{Chunk, ChunkError, Chunker};

/// Configuration for the entity extraction pass.
///
/// Entity windows are shorter than summarization windows, with a
/// smaller overlap to match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Chunk window in words.
    #[serde(default = "default_chunk_words")]
    pub chunk_words: usize,
    /// Words shared between adjacent chunks.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    /// Chunk recognition calls in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-chunk inference timeout in seconds.
    #[serde(default = "default_chunk_timeout_secs")]
    pub chunk_timeout_secs: u64,
    /// Sub-token continuation marker stripped from raw values.
    ///
    /// An artifact of the backend's tokenizer (WordPiece emits `##`),
    /// so it is configuration rather than a constant.
    #[serde(default = "default_fragment_marker")]
    pub fragment_marker: String,
}

fn default_chunk_words() -> usize {
    500
}

fn default_overlap() -> usize {
    50
}

fn default_concurrency() -> usize {
    4
}

fn default_chunk_timeout_secs() -> u64 {
    120
}

fn default_fragment_marker() -> String {
    "##".to_string()
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            chunk_words: default_chunk_words(),
            overlap: default_overlap(),
            concurrency: default_concurrency(),
            chunk_timeout_secs: default_chunk_timeout_secs(),
            fragment_marker: default_fragment_marker(),
        }
    }
}

/// Deduplicated mapping from entity-type label to normalized values.
///
/// Iteration order is deterministic (sorted) so reports are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityIndex {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl EntityIndex {
    /// Insert a normalized value under a type label.
    /// Returns false when the value was already present.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) -> bool {
        self.entries.entry(label.into()).or_default().insert(value.into())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct entity-type labels.
    pub fn label_count(&self) -> usize {
        self.entries.len()
    }

    /// Total normalized values across all labels.
    pub fn value_count(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }

    pub fn values(&self, label: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.entries.iter()
    }
}

/// Statistics for one document's extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Chunk recognition calls attempted.
    pub chunks_processed: usize,
    /// Calls that failed or timed out and were skipped.
    pub chunks_failed: usize,
    /// Raw spans returned by the capability.
    pub spans_seen: usize,
    /// Spans dropped as malformed or empty after normalization.
    pub spans_dropped: usize,
}

/// Result of extracting one document.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub entities: EntityIndex,
    pub stats: ExtractionStats,
}

/// Drives chunk-level entity recognition and merges spans into an
/// `EntityIndex`.
pub struct EntityAggregator {
    config: AggregatorConfig,
    chunker: Chunker,
}

impl EntityAggregator {
    /// Create an aggregator, rejecting non-terminating chunk configurations.
    pub fn new(config: AggregatorConfig) -> Result<Self, ChunkError> {
        let chunker = Chunker::new(config.chunk_words, config.overlap)?;
        Ok(Self { config, chunker })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Extract and merge entities for one document.
    ///
    /// The per-chunk calls run concurrently; the merge into the index
    /// happens single-threaded afterwards, so no synchronization is
    /// needed on the accumulator. Merge order does not affect the
    /// resulting sets.
    pub async fn extract(
        &self,
        text: &str,
        recognizer: &dyn EntityRecognizer,
    ) -> ExtractionOutcome {
        let mut entities = EntityIndex::default();
        let mut stats = ExtractionStats::default();

        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            return ExtractionOutcome { entities, stats };
        }
        debug!(chunks = chunks.len(), "entity extraction pass");

        let results = self.recognize_chunks(&chunks, recognizer).await;

        for (chunk, result) in chunks.iter().zip(results) {
            stats.chunks_processed += 1;
            match result {
                Ok(spans) => {
                    for span in spans {
                        stats.spans_seen += 1;
                        match self.normalize(&span) {
                            Some((label, value)) => {
                                entities.insert(label, value);
                            }
                            None => stats.spans_dropped += 1,
                        }
                    }
                }
                Err(failure) => {
                    stats.chunks_failed += 1;
                    warn!(chunk = chunk.index, "chunk entity extraction skipped: {failure}");
                }
            }
        }

        ExtractionOutcome { entities, stats }
    }

    /// Normalize a raw span into a (label, value) pair, or None when
    /// the span is malformed or normalizes to nothing.
    ///
    /// Fragment-marker removal joins sub-token pieces in place; it does
    /// not re-join multi-token names split across spans.
    fn normalize(&self, span: &EntitySpan) -> Option<(String, String)> {
        let label = span.label.trim();
        if label.is_empty() {
            return None;
        }

        let joined = if self.config.fragment_marker.is_empty() {
            span.text.clone()
        } else {
            span.text.replace(&self.config.fragment_marker, "")
        };
        let value = joined
            .trim_matches(|c: char| c.is_whitespace() || is_edge_punctuation(c));
        if value.is_empty() {
            return None;
        }

        Some((label.to_owned(), value.to_owned()))
    }

    async fn recognize_chunks(
        &self,
        chunks: &[Chunk],
        recognizer: &dyn EntityRecognizer,
    ) -> Vec<Result<Vec<EntitySpan>, ChunkFailure>> {
        let timeout = Duration::from_secs(self.config.chunk_timeout_secs);
        stream::iter(chunks.iter().map(|chunk| async move {
            match tokio::time::timeout(timeout, recognizer.recognize(&chunk.text)).await {
                Ok(Ok(spans)) => Ok(spans),
                Ok(Err(e)) => Err(ChunkFailure::Capability(e)),
                Err(_) => Err(ChunkFailure::TimedOut),
            }
        }))
        .buffered(self.config.concurrency.max(1))
        .collect()
        .await
    }
}

/// Punctuation stripped from value edges during normalization.
fn is_edge_punctuation(c: char) -> bool {
    matches!(c, ',' | '.' | '\'' | '"' | ';' | ':' | '(' | ')' | '[' | ']')
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::super::capability::CapabilityError;
    use super::*;

    /// Returns a fixed span list for every chunk.
    struct FixedSpans(Vec<EntitySpan>);

    #[async_trait]
    impl EntityRecognizer for FixedSpans {
        async fn recognize(&self, _text: &str) -> Result<Vec<EntitySpan>, CapabilityError> {
            Ok(self.0.clone())
        }
    }

    /// Always fails.
    struct AlwaysFails;

    #[async_trait]
    impl EntityRecognizer for AlwaysFails {
        async fn recognize(&self, _text: &str) -> Result<Vec<EntitySpan>, CapabilityError> {
            Err(CapabilityError::Api("backend down".into()))
        }
    }

    fn aggregator() -> EntityAggregator {
        EntityAggregator::new(AggregatorConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let cfg = AggregatorConfig {
            chunk_words: 10,
            overlap: 10,
            ..Default::default()
        };
        assert!(EntityAggregator::new(cfg).is_err());
    }

    #[tokio::test]
    async fn test_empty_document_empty_index() {
        let outcome = aggregator().extract("", &AlwaysFails).await;
        assert!(outcome.entities.is_empty());
        assert_eq!(outcome.stats.chunks_processed, 0);
    }

    #[tokio::test]
    async fn test_failed_chunks_skipped() {
        let outcome = aggregator().extract("some document text", &AlwaysFails).await;
        assert!(outcome.entities.is_empty());
        assert_eq!(outcome.stats.chunks_processed, 1);
        assert_eq!(outcome.stats.chunks_failed, 1);
    }

    #[tokio::test]
    async fn test_dedup_of_punctuation_variants() {
        // Overlapping chunks capture the same organization with and
        // without the trailing period; both normalize to one value.
        let cfg = AggregatorConfig {
            chunk_words: 5,
            overlap: 2,
            ..Default::default()
        };
        let agg = EntityAggregator::new(cfg).unwrap();

        struct Alternating;

        #[async_trait]
        impl EntityRecognizer for Alternating {
            async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, CapabilityError> {
                if text.starts_with("w0") {
                    Ok(vec![EntitySpan::new("ORG", "Acme Corp.")])
                } else {
                    Ok(vec![EntitySpan::new("ORG", "Acme Corp")])
                }
            }
        }

        let doc = (0..8).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let outcome = agg.extract(&doc, &Alternating).await;

        let orgs = outcome.entities.values("ORG").unwrap();
        assert_eq!(orgs.len(), 1);
        assert!(orgs.contains("Acme Corp"));
    }

    #[tokio::test]
    async fn test_fragment_marker_stripped() {
        let recognizer = FixedSpans(vec![
            EntitySpan::new("ORG", "Acme"),
            EntitySpan::new("ORG", "##Corp"),
        ]);
        let outcome = aggregator()
            .extract("Acme Corp. signed a contract. The penalty clause applies.", &recognizer)
            .await;

        let orgs = outcome.entities.values("ORG").unwrap();
        assert_eq!(orgs.len(), 2);
        assert!(orgs.contains("Acme"));
        // Fragment cleanup joins sub-tokens in place; it does not
        // re-attach the fragment to the preceding token.
        assert!(orgs.contains("Corp"));
    }

    #[tokio::test]
    async fn test_malformed_spans_dropped() {
        let recognizer = FixedSpans(vec![
            EntitySpan::new("", "Acme"),
            EntitySpan::new("ORG", "   "),
            EntitySpan::new("ORG", ",.'"),
            EntitySpan::new("ORG", "##"),
            EntitySpan::new("PERSON", "Jane Roe"),
        ]);
        let outcome = aggregator().extract("some text", &recognizer).await;

        assert_eq!(outcome.stats.spans_seen, 5);
        assert_eq!(outcome.stats.spans_dropped, 4);
        assert_eq!(outcome.entities.value_count(), 1);
        assert!(outcome.entities.values("PERSON").unwrap().contains("Jane Roe"));
    }

    #[tokio::test]
    async fn test_values_keyed_by_raw_label() {
        let recognizer = FixedSpans(vec![
            EntitySpan::new("ORG", "Acme"),
            EntitySpan::new("org", "Acme"),
        ]);
        let outcome = aggregator().extract("text", &recognizer).await;

        // Labels are taken as the capability reports them.
        assert_eq!(outcome.entities.label_count(), 2);
    }

    #[test]
    fn test_index_insert_dedups() {
        let mut index = EntityIndex::default();
        assert!(index.insert("ORG", "Acme"));
        assert!(!index.insert("ORG", "Acme"));
        assert_eq!(index.value_count(), 1);
    }
}
