//! LLM collaborator interface
//!
//! The engine never talks to a model directly; the session loop owns the
//! client. This module defines the seam the engine needs from it: a token
//! counter for pricing segments and a generate call for the summarization the
//! session loop may feed back in via `ContextManager::add_summary`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Rough token estimate for callers without a real tokenizer.
///
/// Four characters per token, the usual approximation for English prose.
/// Token counts supplied to the engine are trusted as-is; this helper exists
/// so plumbing code has something consistent to price text with.
pub fn estimate_tokens(text: &str) -> usize {
    text.len() / 4
}

/// Sampling parameters for a generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Temperature for generation (0.0-2.0, default: 0.7)
    pub temperature: f32,

    /// Nucleus sampling cutoff (default: 0.9)
    pub top_p: f32,

    /// Maximum tokens to generate (default: 500)
    pub max_tokens: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 500,
        }
    }
}

impl GenerationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = tokens;
        self
    }
}

/// Response from a generation call
#[derive(Debug, Clone)]
pub struct Completion {
    /// Generated text
    pub text: String,

    /// Tokens consumed by the request, when the provider reports it
    pub usage_tokens: Option<usize>,
}

/// Interface to the external LLM client.
///
/// Implementations own transport, retries, and timeouts; the engine calls
/// these methods and nothing else.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Count tokens in a piece of text using the provider's tokenizer
    fn count_tokens(&self, text: &str) -> usize;

    /// Generate a response for a prompt
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Completion>;
}

/// Placeholder provider for wiring and tests.
///
/// Counts tokens with [`estimate_tokens`] and refuses to generate.
pub struct StubProvider;

#[async_trait]
impl LlmProvider for StubProvider {
    fn count_tokens(&self, text: &str) -> usize {
        estimate_tokens(text)
    }

    async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<Completion> {
        Err(crate::error::FabulaError::Configuration(
            "LLM provider not configured. Implement the LlmProvider trait for your LLM".to_string(),
        ))
    }
}
