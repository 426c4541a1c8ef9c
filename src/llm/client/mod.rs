//! LLM client for chunk summarization and entity extraction.
//!
//! Speaks the Ollama generate API for local inference. Implements the
//! pipeline's `Summarizer` and `EntityRecognizer` capabilities so it
//! can be injected wherever a stub or regex backend would otherwise go.

mod config;
mod prompts;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::analysis::{CapabilityError, EntityRecognizer, EntitySpan, Summarizer};

pub use config::LlmConfig;

/// LLM client for document analysis.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300)) // 5 min timeout for slow models
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Check if the LLM service is available.
    pub async fn is_available(&self) -> bool {
        if !self.config.enabled {
            return false;
        }
        let url = format!("{}/api/tags", self.config.endpoint);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// List available models.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.config.endpoint);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LlmError::Api(format!("HTTP {}", resp.status())));
        }

        #[derive(Deserialize)]
        struct TagsResponse {
            models: Vec<ModelInfo>,
        }

        #[derive(Deserialize)]
        struct ModelInfo {
            name: String,
        }

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Summarize one chunk of document text.
    pub async fn summarize_chunk(
        &self,
        text: &str,
        min_words: usize,
        max_words: usize,
    ) -> Result<String, LlmError> {
        let truncated = self.truncate_content(text);
        let prompt = self
            .config
            .get_summary_prompt()
            .replace("{min_words}", &min_words.to_string())
            .replace("{max_words}", &max_words.to_string())
            .replace("{content}", truncated);

        debug!(words = max_words, "summarizing chunk");
        let response = self.call_ollama(&prompt).await?;

        let summary = response.trim().to_string();
        if summary.is_empty() {
            return Err(LlmError::Parse("Empty summary response".to_string()));
        }

        Ok(summary)
    }

    /// Extract entity spans from one chunk of document text.
    pub async fn extract_entities(&self, text: &str) -> Result<Vec<EntitySpan>, LlmError> {
        let truncated = self.truncate_content(text);
        let prompt = self
            .config
            .get_entities_prompt()
            .replace("{content}", truncated);

        debug!("extracting entities from chunk");
        let response = self.call_ollama(&prompt).await?;

        Ok(parse_entity_lines(&response))
    }

    /// Truncate content to configured maximum (UTF-8 safe).
    fn truncate_content<'a>(&self, text: &'a str) -> &'a str {
        if text.len() <= self.config.max_content_chars {
            return text;
        }
        // Find a valid UTF-8 boundary at or before max_content_chars
        let mut end = self.config.max_content_chars;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }

    /// Call Ollama API with a prompt.
    async fn call_ollama(&self, prompt: &str) -> Result<String, LlmError> {
        if !self.config.enabled {
            return Err(LlmError::Disabled);
        }

        let request = OllamaRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let ollama_resp: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(ollama_resp.response)
    }
}

/// Parse `TYPE: value` lines from an entity extraction response.
///
/// Tolerates list markers and a NONE sentinel; anything that does not
/// look like a labelled line is ignored rather than failing the chunk.
fn parse_entity_lines(response: &str) -> Vec<EntitySpan> {
    response
        .lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', ' ']))
        .filter(|line| !line.is_empty() && !line.eq_ignore_ascii_case("none"))
        .filter_map(|line| {
            let (label, value) = line.split_once(':')?;
            let label = label.trim();
            let value = value.trim();
            if label.is_empty()
                || value.is_empty()
                || !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return None;
            }
            Some(EntitySpan::new(label.to_uppercase(), value))
        })
        .take(200) // Cap runaway responses
        .collect()
}

#[async_trait]
impl Summarizer for LlmClient {
    async fn summarize(
        &self,
        text: &str,
        min_words: usize,
        max_words: usize,
    ) -> Result<String, CapabilityError> {
        self.summarize_chunk(text, min_words, max_words)
            .await
            .map_err(CapabilityError::from)
    }
}

#[async_trait]
impl EntityRecognizer for LlmClient {
    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, CapabilityError> {
        self.extract_entities(text).await.map_err(CapabilityError::from)
    }
}

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("LLM is disabled")]
    Disabled,
}

impl From<LlmError> for CapabilityError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Connection(msg) => CapabilityError::Connection(msg),
            LlmError::Api(msg) => CapabilityError::Api(msg),
            LlmError::Parse(msg) => CapabilityError::Parse(msg),
            LlmError::Disabled => CapabilityError::Unavailable("LLM is disabled".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entity_lines() {
        let spans = parse_entity_lines(
            "ORG: Acme Corp\nPERSON: Jane Roe\nCOURT: Southern District of New York",
        );
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0], EntitySpan::new("ORG", "Acme Corp"));
        assert_eq!(spans[2].label, "COURT");
    }

    #[test]
    fn test_parse_entity_lines_tolerates_markers_and_noise() {
        let spans = parse_entity_lines(
            "Here are the entities:\n- ORG: Acme Corp\n* DATE: March 3, 2021\n\nnot a labelled line",
        );
        // The preamble line contains a colon but its label has spaces,
        // so only the marked lines survive.
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1], EntitySpan::new("DATE", "March 3, 2021"));
    }

    #[test]
    fn test_parse_entity_lines_none_sentinel() {
        assert!(parse_entity_lines("NONE").is_empty());
        assert!(parse_entity_lines("none\n").is_empty());
    }

    #[test]
    fn test_parse_entity_lines_lowercase_label_normalized() {
        let spans = parse_entity_lines("org: Acme");
        assert_eq!(spans[0].label, "ORG");
    }

    #[test]
    fn test_truncate_content_utf8_boundary() {
        let config = LlmConfig {
            max_content_chars: 5,
            ..Default::default()
        };
        let client = LlmClient::new(config);
        // 'é' is two bytes; truncation must not split it.
        let truncated = client.truncate_content("abcdéf");
        assert!(truncated.len() <= 5);
        assert!(truncated.is_char_boundary(truncated.len()));
    }

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert!(config.enabled);
        assert!(config.model.contains("dolphin"));
        assert!(config.summary_prompt.is_none());
        assert!(config.get_summary_prompt().contains("{content}"));
        assert!(config.get_entities_prompt().contains("{content}"));
    }
}
