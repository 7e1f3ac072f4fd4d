//! # Fabula - Context Budgeting and Long-Term Memory for Interactive Fiction
//!
//! Fabula curates the bounded-size textual context fed to a large language
//! model on every turn of an interactive fiction session. It provides:
//! - Token-budgeted context assembly across categorized content buffers
//! - A prioritized, multi-stage compression pipeline under a global ceiling
//! - A durable, deduplicated long-term memory store with importance scoring
//! - Time-decayed relevance ranking and periodic compaction into summaries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fabula_core::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut context = ContextManager::new(ContextConfig::default());
//!     let mut memory = MemoryStore::open(MemoryConfig::default());
//!
//!     // Record a turn durably and in the context window
//!     memory.add_memory(
//!         "Rem drew her blade at the bridge",
//!         AddMemory::new().with_character("Rem").with_importance(0.8),
//!     );
//!     context.add_message("Rem drew her blade at the bridge", 12, &["Rem".into()], &[], 0.8);
//!
//!     // Assemble the prompt for the LLM collaborator
//!     let prompt = context.build_context("You are the narrator.");
//!     println!("{prompt}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Two cooperating components, dependency order:
//! - **`memory`**: the leaf. Durable entries tagged by character, emotion,
//!   and topic, deduplicated by content hash, partitioned into recent /
//!   important / per-character / summaries views, persisted as one JSON
//!   snapshot.
//! - **`context`**: five buffers of token-priced segments (recent dialogue,
//!   character sheets, world state, memories, summaries). When the total
//!   exceeds the ceiling, a fixed three-stage pipeline archives old dialogue,
//!   folds excess memories, then evicts the least important overflow.
//!
//! The engine is synchronous and single-writer by contract: every mutation
//! runs to completion before returning, and callers that share a store across
//! threads must serialize access themselves. The LLM collaborator is reached
//! only through the [`llm::LlmProvider`] trait.

pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod memory;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ConfigBuilder, FabulaConfig};
    pub use crate::context::{
        CategoryCounts, CategoryTokens, ContentSegment, ContextConfig, ContextManager,
        ContextStats, SegmentCategory,
    };
    pub use crate::error::{FabulaError, Result};
    pub use crate::llm::{estimate_tokens, Completion, GenerationParams, LlmProvider, StubProvider};
    pub use crate::memory::{
        AddMemory, MemoryConfig, MemoryEntry, MemoryQuery, MemoryStats, MemoryStore,
    };
}
