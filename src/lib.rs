//! Lexamine - legal document analysis and summarization system.
//!
//! Extracts text from heterogeneous document formats, produces an
//! abstractive summary via a bounded-input inference backend, and
//! builds a deduplicated index of named entities.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod extract;
pub mod llm;
pub mod ner;
