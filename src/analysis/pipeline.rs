//! Pipeline orchestration: text in, combined report out.

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use super::aggregator::{AggregatorConfig, EntityAggregator};
use super::capability::{EntityRecognizer, Summarizer};
use super::chunker::ChunkError;
use super::reducer::{ReducerConfig, SummaryReducer};
use super::report::{AnalysisStats, Report};

/// Errors from the document pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Illegal chunking parameters; caught before any processing.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ChunkError),

    /// Every chunk of both passes failed on a non-empty document.
    #[error(
        "analysis produced no output: all {summary_chunks} summary chunks and all {entity_chunks} entity chunks failed"
    )]
    AllAnalysesFailed {
        summary_chunks: usize,
        entity_chunks: usize,
    },
}

/// Orchestrates the summary and entity passes over one document.
///
/// The two passes share no state and run concurrently; each holds its
/// own chunker tuned to its backend's window.
pub struct Pipeline {
    reducer: SummaryReducer,
    aggregator: EntityAggregator,
}

impl Pipeline {
    /// Build a pipeline, validating both chunking configurations.
    pub fn new(
        summarizer: ReducerConfig,
        entities: AggregatorConfig,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            reducer: SummaryReducer::new(summarizer)?,
            aggregator: EntityAggregator::new(entities)?,
        })
    }

    /// Analyze one document's extracted text.
    ///
    /// A document with no extractable words yields an empty report, not
    /// an error. Per-chunk inference failures are absorbed by the
    /// passes; the pipeline fails only when a non-empty document got no
    /// output from either pass because every chunk failed.
    pub async fn process(
        &self,
        text: &str,
        summarizer: &dyn Summarizer,
        recognizer: &dyn EntityRecognizer,
    ) -> Result<Report, PipelineError> {
        if text.split_whitespace().next().is_none() {
            info!("document has no extractable text");
            return Ok(Report::empty());
        }

        let (summary, extraction) = tokio::join!(
            self.reducer.reduce(text, summarizer),
            self.aggregator.extract(text, recognizer)
        );

        let summary_all_failed = summary.stats.chunks_processed > 0
            && summary.stats.chunks_failed == summary.stats.chunks_processed;
        let entities_all_failed = extraction.stats.chunks_processed > 0
            && extraction.stats.chunks_failed == extraction.stats.chunks_processed;

        if summary.text.is_empty()
            && extraction.entities.is_empty()
            && summary_all_failed
            && entities_all_failed
        {
            return Err(PipelineError::AllAnalysesFailed {
                summary_chunks: summary.stats.chunks_processed,
                entity_chunks: extraction.stats.chunks_processed,
            });
        }

        info!(
            rounds = summary.stats.rounds,
            summary_failed = summary.stats.chunks_failed,
            entity_labels = extraction.entities.label_count(),
            entity_values = extraction.entities.value_count(),
            "document analysis complete"
        );

        Ok(Report {
            summary: summary.text,
            entities: extraction.entities,
            stats: AnalysisStats {
                summary: summary.stats,
                entities: extraction.stats,
            },
            generated_at: Utc::now(),
        })
    }
}
