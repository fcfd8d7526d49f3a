//! Content generation for ClipStream.
//!
//! This crate provides:
//! - The [`ContentGenerator`] contract used by pipeline steps
//! - A Gemini REST client
//! - A deterministic offline generator and a fallback wrapper

pub mod config;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod offline;
mod prompts;
pub mod resilient;

pub use config::GeminiConfig;
pub use error::{GenAiError, GenAiResult};
pub use gemini::GeminiClient;
pub use generator::{ContentGenerator, HighlightRequest};
pub use offline::OfflineGenerator;
pub use resilient::ResilientGenerator;
