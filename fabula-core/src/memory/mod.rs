//! Durable long-term memory for narrative sessions
//!
//! The store keeps memory entries in four partitions — recent, important,
//! per-character, and summaries — with content-hash deduplication across the
//! global partitions, automatic topic tagging, and a blended
//! importance-and-recency relevance score for retrieval. State persists as a
//! single JSON snapshot rewritten on every mutation.
//!
//! ```
//! use fabula_core::memory::{AddMemory, MemoryConfig, MemoryQuery, MemoryStore};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut store = MemoryStore::open(MemoryConfig::new().with_storage_dir(dir.path()));
//!
//! store.add_memory(
//!     "Rem drew her blade at the bridge",
//!     AddMemory::new().with_character("Rem").with_importance(0.8),
//! );
//!
//! let found = store.retrieve_memories(&MemoryQuery::new().with_character("Rem"));
//! assert_eq!(found.len(), 1);
//! ```

mod config;
mod entry;
mod store;
mod tags;

pub use config::MemoryConfig;
pub use entry::{content_hash, MemoryEntry};
pub use store::{AddMemory, MemoryQuery, MemoryStats, MemoryStore};
pub use tags::extract_tags;
