//! Document analysis command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::analysis::{
    EntityRecognizer, FileReportSink, LeadSummarizer, Pipeline, Report, ReportFormat, ReportSink,
    Summarizer,
};
use crate::cli::helpers::truncate;
use crate::config::{Config, EntityBackendKind};
use crate::extract::TextExtractor;
use crate::llm::LlmClient;
use crate::ner::RegexRecognizer;

/// Command-line overrides applied on top of the loaded config.
pub struct AnalyzeOverrides {
    pub output: Option<PathBuf>,
    pub format: Option<ReportFormat>,
    pub backend: Option<EntityBackendKind>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub stdout: bool,
}

/// Analyze one document end to end: extract, summarize, index, report.
pub async fn cmd_analyze(
    mut config: Config,
    file: &Path,
    overrides: AnalyzeOverrides,
) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("file not found: {}", file.display());
    }

    if let Some(ref endpoint) = overrides.endpoint {
        config.llm.endpoint = endpoint.clone();
    }
    if let Some(ref model) = overrides.model {
        config.llm.model = model.clone();
    }
    let backend = overrides.backend.unwrap_or(config.entities.backend);
    let format = overrides.format.unwrap_or(config.output.format);

    // Extraction
    let spinner = progress_spinner(format!("Extracting text from {}", file.display()));
    let extraction = TextExtractor::new().extract(file)?;
    spinner.finish_and_clear();

    let word_count = extraction.text.split_whitespace().count();
    println!(
        "{} Extracted {} words via {}{}",
        style("✓").green(),
        word_count,
        extraction.method.describe(),
        extraction
            .page_count
            .map(|p| format!(" ({} pages)", p))
            .unwrap_or_default()
    );

    // Capability wiring
    let llm_client = LlmClient::new(config.llm.clone());
    let llm_usable = llm_client.is_available().await;

    let lead = LeadSummarizer;
    let summarizer: &dyn Summarizer = if llm_usable {
        println!(
            "{} Connected to LLM at {} (model: {})",
            style("✓").green(),
            config.llm.endpoint,
            config.llm.model
        );
        &llm_client
    } else {
        println!(
            "{} {}; falling back to extractive summaries",
            style("!").yellow(),
            config.llm.availability_hint()
        );
        &lead
    };

    let regex_recognizer = RegexRecognizer::new();
    let recognizer: &dyn EntityRecognizer = match backend {
        EntityBackendKind::Llm if llm_usable => &llm_client,
        EntityBackendKind::Llm => {
            println!(
                "{} LLM entity backend unavailable; using the regex backend",
                style("!").yellow()
            );
            &regex_recognizer
        }
        EntityBackendKind::Regex => &regex_recognizer,
    };

    // Analysis
    let pipeline = Pipeline::new(config.summarizer.clone(), config.entities.aggregator.clone())?;
    let spinner = progress_spinner("Analyzing document".to_string());
    let report = pipeline.process(&extraction.text, summarizer, recognizer).await?;
    spinner.finish_and_clear();

    print_report_summary(&report);

    // Report output
    if overrides.stdout {
        println!("\n{}", report.render_text());
        return Ok(());
    }

    let directory = overrides
        .output
        .unwrap_or_else(|| config.output.directory_path());
    let sink = FileReportSink::for_document(directory, file, format);
    let path = sink.write(&report).await?;
    println!("{} Report written to {}", style("✓").green(), path.display());

    Ok(())
}

fn progress_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("spinner template should parse"),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_report_summary(report: &Report) {
    if report.is_empty() {
        println!(
            "{} Document contained no extractable text; empty report",
            style("!").yellow()
        );
        return;
    }

    println!(
        "{} Summary ({} words): {}",
        style("✓").green(),
        report.summary.split_whitespace().count(),
        truncate(&report.summary, 120)
    );
    println!(
        "{} Entities: {} values across {} types",
        style("✓").green(),
        report.entities.value_count(),
        report.entities.label_count()
    );

    let stats = &report.stats;
    if stats.summary.chunks_failed > 0 {
        println!(
            "{} {} of {} summary chunks failed",
            style("!").yellow(),
            stats.summary.chunks_failed,
            stats.summary.chunks_processed
        );
    }
    if stats.entities.chunks_failed > 0 {
        println!(
            "{} {} of {} entity chunks failed",
            style("!").yellow(),
            stats.entities.chunks_failed,
            stats.entities.chunks_processed
        );
    }
    if !report.converged() {
        println!(
            "{} Summary did not converge within {} rounds; best available reported",
            style("!").yellow(),
            stats.summary.rounds
        );
    }
}
