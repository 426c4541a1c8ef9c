//! Configuration management for Lexamine.
//!
//! Settings come from an optional `lexamine.toml` (working directory,
//! then the user config directory), with environment overrides applied
//! on top for the LLM section. Every field has a serde default, so an
//! absent file or a sparse file both work.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::analysis::{AggregatorConfig, ReducerConfig, ReportFormat};
use crate::llm::LlmConfig;

/// Config file name searched for in the working directory.
pub const CONFIG_FILE_NAME: &str = "lexamine.toml";

/// Which entity-recognition backend the analyze command wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EntityBackendKind {
    /// Built-in pattern matching tuned for legal documents.
    #[default]
    Regex,
    /// LLM-backed extraction via the configured model.
    Llm,
}

/// The `[entities]` section: backend choice plus the aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitiesConfig {
    #[serde(default)]
    pub backend: EntityBackendKind,
    #[serde(flatten)]
    pub aggregator: AggregatorConfig,
}

/// The `[output]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory reports are written to; tilde expansion applies.
    #[serde(default = "default_output_directory")]
    pub directory: String,
    #[serde(default)]
    pub format: ReportFormat,
}

fn default_output_directory() -> String {
    "legal_document_analysis".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            format: ReportFormat::default(),
        }
    }
}

impl OutputConfig {
    /// Output directory with `~` expanded.
    pub fn directory_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.directory).into_owned())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub summarizer: ReducerConfig,
    #[serde(default)]
    pub entities: EntitiesConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from an explicit path or by discovery,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let discovered;
        let path = match path {
            Some(p) => Some(p),
            None => {
                discovered = Self::discover();
                discovered.as_deref()
            }
        };

        let mut config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)
                    .with_context(|| format!("reading config file {}", p.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", p.display()))?
            }
            None => Self::default(),
        };

        config.llm = config.llm.with_env_overrides();
        Ok(config)
    }

    /// Look for a config file in the working directory, then the user
    /// config directory.
    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        let user = dirs::config_dir()?.join("lexamine").join("config.toml");
        user.exists().then_some(user)
    }
}
