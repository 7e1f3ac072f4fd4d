//! Durable memory records

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 over `content + context key`.
///
/// This is the sole deduplication key for the store: two entries with the
/// same content in the same external context are the same memory.
pub fn content_hash(content: &str, context_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.update(context_key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A durable memory record.
///
/// Entries are immutable after creation: compaction produces new summary
/// entries rather than editing originals. Character, emotion, and tag fields
/// are ordered lists; timestamps serialize as ISO-8601.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub importance: f64,
    pub characters: Vec<String>,
    pub emotions: Vec<String>,
    pub tags: Vec<String>,
    pub content_hash: String,

    /// Set only on compacted summary entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Escape hatch for unmodeled properties
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl MemoryEntry {
    /// Hours elapsed since the entry was created
    pub fn age_hours(&self) -> f64 {
        let elapsed = Utc::now().signed_duration_since(self.created_at);
        elapsed.num_seconds() as f64 / 3600.0
    }

    /// Blended importance-and-recency ranking score.
    ///
    /// The age factor decays linearly to a floor of 0.1 over one week, so an
    /// old but important memory never ranks at zero.
    pub fn relevance(&self) -> f64 {
        let age_factor = (1.0 - self.age_hours() / (24.0 * 7.0)).max(0.1);
        self.importance * 0.7 + age_factor * 0.3
    }

    /// Case-insensitive substring match against content and, when present,
    /// the compacted summary text
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        if self.content.to_lowercase().contains(&query) {
            return true;
        }
        self.summary
            .as_ref()
            .is_some_and(|s| s.to_lowercase().contains(&query))
    }
}
