//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod check;
mod config_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::analysis::ReportFormat;
use crate::config::{Config, EntityBackendKind};

#[derive(Parser)]
#[command(name = "lex")]
#[command(about = "Legal document analysis and summarization system")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a document: summarize it and index its entities
    Analyze {
        /// Document to analyze (PDF, DOCX, TXT, HTML, EML, or image)
        file: PathBuf,

        /// Output directory for the report (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format (overrides config)
        #[arg(short, long)]
        format: Option<ReportFormat>,

        /// Entity recognition backend (overrides config)
        #[arg(short, long)]
        backend: Option<EntityBackendKind>,

        /// LLM endpoint (overrides config)
        #[arg(long, env = "LLM_ENDPOINT")]
        endpoint: Option<String>,

        /// LLM model (overrides config)
        #[arg(long, env = "LLM_MODEL")]
        model: Option<String>,

        /// Print the report to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Check availability of external tools and the LLM service
    Check,

    /// Show the effective configuration
    Config,
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            file,
            output,
            format,
            backend,
            endpoint,
            model,
            stdout,
        } => {
            analyze::cmd_analyze(
                config,
                &file,
                analyze::AnalyzeOverrides {
                    output,
                    format,
                    backend,
                    endpoint,
                    model,
                    stdout,
                },
            )
            .await
        }
        Commands::Check => check::cmd_check(&config).await,
        Commands::Config => config_cmd::cmd_config(&config),
    }
}
