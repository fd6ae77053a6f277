//! CLI Commands
//!
//! Each subcommand takes an already-resolved [`Config`]; `main.rs` owns
//! argument parsing, logging setup and the async runtime.

pub mod config;
pub mod feedback;
pub mod learning;
pub mod recommend;
pub mod serve;
pub mod template;

use std::sync::Arc;

use crate::config::Config;
use crate::constants::llm;
use crate::learning::FeedbackProcessor;
use crate::types::Result;

/// Open the feedback log when learning is enabled
pub fn open_learning(config: &Config) -> Result<Option<Arc<FeedbackProcessor>>> {
    if !config.features.learning {
        return Ok(None);
    }
    let processor = FeedbackProcessor::open(&config.learning.storage_path)?;
    Ok(Some(Arc::new(processor)))
}

/// Apply `--llm` / `--model` overrides on top of the loaded configuration
pub fn apply_llm_overrides(config: &mut Config, provider: Option<String>, model: Option<String>) {
    if let Some(provider) = provider {
        let provider = provider.to_lowercase();
        if provider != config.llm.provider && model.is_none() {
            config.llm.model = match provider.as_str() {
                "openai" => llm::DEFAULT_OPENAI_MODEL,
                _ => llm::DEFAULT_GEMINI_MODEL,
            }
            .to_string();
        }
        config.llm.provider = provider;
    }
    if let Some(model) = model {
        config.llm.model = model;
    }
}
