//! Text generation backends
//!
//! The pipeline treats generation as an opaque capability: a prompt goes in,
//! text or an error comes out. Classifier and drafter strategies hold an
//! `Arc<dyn TextGenerator>` and fall back to heuristics on any error.

pub mod client;

pub use client::{OllamaClient, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};

use async_trait::async_trait;

use crate::errors::Result;

/// Prompt-in, text-out generation capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier reported in response metadata
    fn model(&self) -> &str;
}
