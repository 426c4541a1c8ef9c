//! Document analysis pipeline.
//!
//! The pipeline takes extracted plain text, splits it into overlapping
//! word windows sized for a bounded-input inference backend, reduces
//! per-chunk summaries into a single summary, and merges per-chunk
//! entity extractions into a deduplicated index.

mod aggregator;
mod capability;
mod chunker;
mod pipeline;
mod reducer;
mod report;

pub use aggregator::{AggregatorConfig, EntityAggregator, EntityIndex, ExtractionOutcome, ExtractionStats};
pub use capability::{
    CapabilityError, ChunkFailure, EntityRecognizer, EntitySpan, LeadSummarizer, Summarizer,
};
pub use chunker::{Chunk, ChunkError, Chunker};
pub use pipeline::{Pipeline, PipelineError};
pub use reducer::{ReducerConfig, ReductionOutcome, ReductionStats, SummaryReducer};
pub use report::{AnalysisStats, FileReportSink, Report, ReportFormat, ReportSink};
