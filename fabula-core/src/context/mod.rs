//! Context budgeting - token-ceiling enforcement and prompt assembly
//!
//! Holds five categorized buffers of token-priced content segments (recent
//! dialogue, character sheets, world state, memories, summaries), enforces a
//! global token ceiling through a three-stage degradation pipeline, and
//! assembles the final prompt text in a fixed section order.
//!
//! # Example
//!
//! ```rust
//! use fabula_core::context::{ContextConfig, ContextManager};
//!
//! let mut ctx = ContextManager::new(
//!     ContextConfig::new()
//!         .with_max_tokens(8192)
//!         .with_recent_token_reserve(2048),
//! );
//!
//! ctx.set_character_sheet("Rem", "A devoted maid with blue hair.", 120);
//! ctx.set_world_state("A storm gathers over the capital.", 80);
//! ctx.add_message("The gates creak open.", 24, &[], &[], 0.5);
//!
//! let prompt = ctx.build_context("You are the narrator.");
//! assert!(prompt.contains("[CHARACTER SHEET]"));
//! ```

mod config;
mod manager;
mod segment;

pub use config::ContextConfig;
pub use manager::{CategoryCounts, CategoryTokens, ContextManager, ContextStats};
pub use segment::{ContentSegment, SegmentCategory};
