//! LLM client configuration.

use serde::{Deserialize, Serialize};

use super::prompts::{DEFAULT_ENTITIES_PROMPT, DEFAULT_SUMMARY_PROMPT};

/// Configuration for the LLM client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Whether LLM-backed analysis is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Ollama-compatible API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model to use for summarization and entity extraction
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Custom prompt for chunk summarization
    /// (uses {content}, {min_words}, and {max_words} placeholders)
    #[serde(default)]
    pub summary_prompt: Option<String>,
    /// Custom prompt for entity extraction (uses {content} placeholder)
    #[serde(default)]
    pub entities_prompt: Option<String>,
    /// Maximum characters of chunk content to send per request
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "dolphin-llama3:8b".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_content_chars() -> usize {
    12000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            summary_prompt: None,
            entities_prompt: None,
            max_content_chars: default_max_content_chars(),
        }
    }
}

impl LlmConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LLM_ENABLED`: "true" or "false"
    /// - `LLM_ENDPOINT`: API endpoint
    /// - `LLM_MODEL`: Model name
    /// - `LLM_MAX_TOKENS`: Maximum tokens in response
    /// - `LLM_TEMPERATURE`: Generation temperature (0.0-1.0)
    /// - `LLM_MAX_CONTENT_CHARS`: Max chunk chars to send
    /// - `LLM_SUMMARY_PROMPT`: Custom summary prompt
    /// - `LLM_ENTITIES_PROMPT`: Custom entity extraction prompt
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("LLM_ENABLED") {
            self.enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }
        if let Ok(val) = std::env::var("LLM_ENDPOINT") {
            self.endpoint = val;
        }
        if let Ok(val) = std::env::var("LLM_MODEL") {
            self.model = val;
        }
        if let Ok(val) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = val.parse() {
                self.max_tokens = n;
            }
        }
        if let Ok(val) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(t) = val.parse() {
                self.temperature = t;
            }
        }
        if let Ok(val) = std::env::var("LLM_MAX_CONTENT_CHARS") {
            if let Ok(n) = val.parse() {
                self.max_content_chars = n;
            }
        }
        if let Ok(val) = std::env::var("LLM_SUMMARY_PROMPT") {
            self.summary_prompt = Some(val);
        }
        if let Ok(val) = std::env::var("LLM_ENTITIES_PROMPT") {
            self.entities_prompt = Some(val);
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Get the summary prompt, using custom or default.
    pub fn get_summary_prompt(&self) -> &str {
        self.summary_prompt.as_deref().unwrap_or(DEFAULT_SUMMARY_PROMPT)
    }

    /// Get the entity extraction prompt, using custom or default.
    pub fn get_entities_prompt(&self) -> &str {
        self.entities_prompt.as_deref().unwrap_or(DEFAULT_ENTITIES_PROMPT)
    }

    /// Human-readable hint shown when the service is unreachable.
    pub fn availability_hint(&self) -> String {
        format!(
            "no LLM service at {} (start one with: ollama serve)",
            self.endpoint
        )
    }
}
