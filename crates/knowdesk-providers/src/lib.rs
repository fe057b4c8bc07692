//! # KnowDesk Providers
//!
//! Upstream LLM clients. Every OpenAI-compatible chat-completions API
//! (the GLM open platform, OpenAI, DeepSeek, local servers) is handled by
//! a single [`OpenAiCompatibleProvider`], distinguished only by endpoint
//! URL and API key.

pub mod openai_compatible;

use knowdesk_core::config::KnowDeskConfig;
use knowdesk_core::error::Result;
use knowdesk_core::traits::Provider;

pub use openai_compatible::OpenAiCompatibleProvider;

/// Create the configured upstream provider.
pub fn create_provider(config: &KnowDeskConfig) -> Result<Box<dyn Provider>> {
    Ok(Box::new(OpenAiCompatibleProvider::from_config(&config.llm)))
}
