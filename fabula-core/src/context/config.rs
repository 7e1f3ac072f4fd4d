//! Context Manager Configuration

use serde::{Deserialize, Serialize};

/// Configuration for context budgeting behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Global token ceiling for assembled context.
    ///
    /// Callers should subtract a response reserve before deriving the
    /// model's output allowance from this.
    pub max_tokens: usize,

    /// Soft minimum of recent-dialogue tokens that compression tries to keep
    pub recent_token_reserve: usize,

    /// Soft minimum reserved for character sheets
    pub character_token_reserve: usize,

    /// Soft minimum reserved for world state
    pub world_token_reserve: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_tokens: 950_000,
            recent_token_reserve: 30_000,
            character_token_reserve: 20_000,
            world_token_reserve: 15_000,
        }
    }
}

impl ContextConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global token ceiling
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the recent-dialogue token reserve
    pub fn with_recent_token_reserve(mut self, reserve: usize) -> Self {
        self.recent_token_reserve = reserve;
        self
    }

    /// Set the character-sheet token reserve
    pub fn with_character_token_reserve(mut self, reserve: usize) -> Self {
        self.character_token_reserve = reserve;
        self
    }

    /// Set the world-state token reserve
    pub fn with_world_token_reserve(mut self, reserve: usize) -> Self {
        self.world_token_reserve = reserve;
        self
    }
}
