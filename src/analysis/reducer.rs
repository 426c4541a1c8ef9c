//! Recursive summary reduction.
//!
//! Long documents are summarized chunk-by-chunk and the partial
//! summaries concatenated; if the concatenation is still longer than
//! one chunk window, it becomes the input of another round. Realistic
//! summarizers shrink their input enough that the word count drops
//! every round, but that is a policy assumption, so rounds are capped
//! and the best available text is returned if the cap is hit.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::capability::{ChunkFailure, Summarizer};
use super::chunker::{Chunk, ChunkError, Chunker};

/// Configuration for the summary reduction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducerConfig {
    /// Largest chunk (in words) the summarization backend accepts.
    #[serde(default = "default_max_chunk_words")]
    pub max_chunk_words: usize,
    /// Words shared between adjacent chunks.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    /// Lower bound requested for each chunk summary.
    #[serde(default = "default_min_summary_words")]
    pub min_summary_words: usize,
    /// Upper bound requested for each chunk summary.
    #[serde(default = "default_max_summary_words")]
    pub max_summary_words: usize,
    /// Round cap for the reduction loop.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    /// Chunk summarization calls in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-chunk inference timeout in seconds.
    #[serde(default = "default_chunk_timeout_secs")]
    pub chunk_timeout_secs: u64,
}

fn default_max_chunk_words() -> usize {
    1000
}

fn default_overlap() -> usize {
    200
}

fn default_min_summary_words() -> usize {
    100
}

fn default_max_summary_words() -> usize {
    250
}

fn default_max_rounds() -> usize {
    4
}

fn default_concurrency() -> usize {
    2
}

fn default_chunk_timeout_secs() -> u64 {
    300
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            max_chunk_words: default_max_chunk_words(),
            overlap: default_overlap(),
            min_summary_words: default_min_summary_words(),
            max_summary_words: default_max_summary_words(),
            max_rounds: default_max_rounds(),
            concurrency: default_concurrency(),
            chunk_timeout_secs: default_chunk_timeout_secs(),
        }
    }
}

/// Statistics for one document's reduction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionStats {
    /// Reduction rounds run (chunk, summarize, concatenate).
    pub rounds: usize,
    /// Chunk summarization calls attempted across all rounds.
    pub chunks_processed: usize,
    /// Calls that failed or timed out and were skipped.
    pub chunks_failed: usize,
    /// False when the round cap was hit with the text still oversized.
    pub converged: bool,
}

/// Result of reducing one document.
#[derive(Debug, Clone)]
pub struct ReductionOutcome {
    /// Final summary text; empty when every chunk failed or the
    /// document had no words.
    pub text: String,
    pub stats: ReductionStats,
}

/// Drives chunk-level summarization and re-summarizes the concatenated
/// partials until the result fits in one chunk window.
pub struct SummaryReducer {
    config: ReducerConfig,
    chunker: Chunker,
}

impl SummaryReducer {
    /// Create a reducer, rejecting non-terminating chunk configurations.
    pub fn new(config: ReducerConfig) -> Result<Self, ChunkError> {
        let chunker = Chunker::new(config.max_chunk_words, config.overlap)?;
        Ok(Self { config, chunker })
    }

    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    /// Reduce a document to a bounded summary.
    ///
    /// Individual chunk failures are skipped and counted; the pass
    /// itself never fails once the reducer is constructed.
    pub async fn reduce(&self, text: &str, summarizer: &dyn Summarizer) -> ReductionOutcome {
        let mut stats = ReductionStats {
            converged: true,
            ..Default::default()
        };
        let mut current = text.to_owned();

        for round in 1..=self.config.max_rounds {
            let chunks = self.chunker.chunk(&current);
            if chunks.is_empty() {
                return ReductionOutcome {
                    text: String::new(),
                    stats,
                };
            }
            stats.rounds = round;
            debug!(round, chunks = chunks.len(), "summary reduction round");

            let results = self.summarize_chunks(&chunks, summarizer).await;

            // Reassemble surviving summaries in chunk order.
            let mut partials: Vec<String> = Vec::with_capacity(results.len());
            for (chunk, result) in chunks.iter().zip(results) {
                stats.chunks_processed += 1;
                match result {
                    Ok(summary) => {
                        let summary = summary.trim();
                        if !summary.is_empty() {
                            partials.push(summary.to_owned());
                        }
                    }
                    Err(failure) => {
                        stats.chunks_failed += 1;
                        warn!(round, chunk = chunk.index, "chunk summarization skipped: {failure}");
                    }
                }
            }

            let combined = partials.join(" ");
            if combined.is_empty() {
                return ReductionOutcome {
                    text: combined,
                    stats,
                };
            }
            if word_count(&combined) <= self.config.max_chunk_words {
                return ReductionOutcome {
                    text: combined,
                    stats,
                };
            }
            current = combined;
        }

        stats.converged = false;
        warn!(
            rounds = stats.rounds,
            words = word_count(&current),
            "summary did not converge within round cap; returning best available"
        );
        ReductionOutcome {
            text: current,
            stats,
        }
    }

    /// Fan chunk summarization out with bounded concurrency.
    ///
    /// `buffered` yields results in input order, so partial summaries
    /// concatenate in chunk order regardless of completion order.
    async fn summarize_chunks(
        &self,
        chunks: &[Chunk],
        summarizer: &dyn Summarizer,
    ) -> Vec<Result<String, ChunkFailure>> {
        let timeout = Duration::from_secs(self.config.chunk_timeout_secs);
        stream::iter(chunks.iter().map(|chunk| async move {
            match tokio::time::timeout(
                timeout,
                summarizer.summarize(
                    &chunk.text,
                    self.config.min_summary_words,
                    self.config.max_summary_words,
                ),
            )
            .await
            {
                Ok(Ok(summary)) => Ok(summary),
                Ok(Err(e)) => Err(ChunkFailure::Capability(e)),
                Err(_) => Err(ChunkFailure::TimedOut),
            }
        }))
        .buffered(self.config.concurrency.max(1))
        .collect()
        .await
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
