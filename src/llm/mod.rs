//! LLM-backed inference capabilities.

mod client;

pub use client::{LlmClient, LlmConfig, LlmError};
