//! The terminal artifact of the pipeline and sinks that persist it.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aggregator::{EntityIndex, ExtractionStats};
use super::reducer::ReductionStats;

/// Per-pass statistics surfaced alongside the analysis output, so a
/// caller can tell "processed, nothing found" from "chunks failed".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub summary: ReductionStats,
    pub entities: ExtractionStats,
}

/// Combined result of analyzing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Abstractive summary; empty when the document was empty or every
    /// summary chunk failed.
    pub summary: String,
    /// Deduplicated entity index.
    pub entities: EntityIndex,
    pub stats: AnalysisStats,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Report for a document with no extractable text.
    pub fn empty() -> Self {
        Self {
            summary: String::new(),
            entities: EntityIndex::default(),
            stats: AnalysisStats {
                summary: ReductionStats {
                    converged: true,
                    ..Default::default()
                },
                entities: ExtractionStats::default(),
            },
            generated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.entities.is_empty()
    }

    /// Whether the summary reduction finished within its round cap.
    pub fn converged(&self) -> bool {
        self.stats.summary.converged
    }

    /// Render the flat text form of the report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str("Summary:\n");
        out.push_str(&self.summary);
        out.push_str("\n\nNamed Entities:\n");
        for (label, values) in self.entities.iter() {
            out.push_str(label);
            out.push_str(": ");
            out.push_str(&values.iter().cloned().collect::<Vec<_>>().join(", "));
            out.push('\n');
        }

        let summary = &self.stats.summary;
        let entities = &self.stats.entities;
        if summary.chunks_failed > 0 || entities.chunks_failed > 0 || !summary.converged {
            out.push_str("\nProcessing Notes:\n");
            if summary.chunks_failed > 0 {
                out.push_str(&format!(
                    "summary: {} of {} chunks failed\n",
                    summary.chunks_failed, summary.chunks_processed
                ));
            }
            if !summary.converged {
                out.push_str(&format!(
                    "summary: did not converge within {} rounds; best available shown\n",
                    summary.rounds
                ));
            }
            if entities.chunks_failed > 0 {
                out.push_str(&format!(
                    "entities: {} of {} chunks failed\n",
                    entities.chunks_failed, entities.chunks_processed
                ));
            }
        }

        out
    }
}

/// Output format for a persisted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Flat text with Summary and Named Entities sections.
    #[default]
    Text,
    /// Structured JSON including processing statistics.
    Json,
}

impl ReportFormat {
    fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }
}

/// Receives the final report for persistence or display.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Write the report, returning where it landed.
    async fn write(&self, report: &Report) -> anyhow::Result<PathBuf>;
}

/// Writes reports to `<directory>/<basename>_analysis.<ext>`.
pub struct FileReportSink {
    directory: PathBuf,
    basename: String,
    format: ReportFormat,
}

impl FileReportSink {
    pub fn new(directory: impl Into<PathBuf>, basename: impl Into<String>, format: ReportFormat) -> Self {
        Self {
            directory: directory.into(),
            basename: basename.into(),
            format,
        }
    }

    /// Sink for a report about the given source document, named after
    /// the document's file stem.
    pub fn for_document(directory: impl Into<PathBuf>, document: &Path, format: ReportFormat) -> Self {
        let basename = document
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Self::new(directory, basename, format)
    }

    pub fn path(&self) -> PathBuf {
        self.directory
            .join(format!("{}_analysis.{}", self.basename, self.format.extension()))
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn write(&self, report: &Report) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .with_context(|| format!("creating output directory {}", self.directory.display()))?;

        let rendered = match self.format {
            ReportFormat::Text => report.render_text(),
            ReportFormat::Json => serde_json::to_string_pretty(report)?,
        };

        let path = self.path();
        tokio::fs::write(&path, rendered)
            .await
            .with_context(|| format!("writing report to {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        let mut entities = EntityIndex::default();
        entities.insert("ORG", "Acme Corp");
        entities.insert("ORG", "Globex");
        entities.insert("PERSON", "Jane Roe");

        Report {
            summary: "The parties agreed to settle.".to_string(),
            entities,
            stats: AnalysisStats {
                summary: ReductionStats {
                    rounds: 1,
                    chunks_processed: 2,
                    chunks_failed: 0,
                    converged: true,
                },
                entities: ExtractionStats {
                    chunks_processed: 3,
                    chunks_failed: 0,
                    spans_seen: 5,
                    spans_dropped: 2,
                },
            },
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_text_sections() {
        let text = sample_report().render_text();
        assert!(text.starts_with("Summary:\nThe parties agreed to settle."));
        assert!(text.contains("Named Entities:\n"));
        assert!(text.contains("ORG: Acme Corp, Globex"));
        assert!(text.contains("PERSON: Jane Roe"));
        assert!(!text.contains("Processing Notes"));
    }

    #[test]
    fn test_render_text_surfaces_failures() {
        let mut report = sample_report();
        report.stats.summary.chunks_failed = 1;
        report.stats.summary.converged = false;
        let text = report.render_text();
        assert!(text.contains("summary: 1 of 2 chunks failed"));
        assert!(text.contains("did not converge"));
    }

    #[test]
    fn test_empty_report() {
        let report = Report::empty();
        assert!(report.is_empty());
        assert!(report.converged());
    }

    #[test]
    fn test_sink_path_naming() {
        let sink = FileReportSink::for_document(
            "out",
            Path::new("/tmp/contracts/master_agreement.pdf"),
            ReportFormat::Text,
        );
        assert_eq!(sink.path(), PathBuf::from("out/master_agreement_analysis.txt"));
    }

    #[tokio::test]
    async fn test_file_sink_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileReportSink::new(dir.path(), "case", ReportFormat::Json);
        let path = sink.write(&sample_report()).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: Report = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.summary, "The parties agreed to settle.");
        assert_eq!(parsed.stats.entities.spans_seen, 5);
    }
}
