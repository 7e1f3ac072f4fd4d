//! Memory Store Configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the long-term memory store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Directory for the persisted snapshot
    pub storage_dir: PathBuf,

    /// Maximum entries in the recent partition
    pub max_recent: usize,

    /// Maximum entries in the important partition
    pub max_important: usize,

    /// Maximum entries per character partition
    pub max_per_character: usize,

    /// Importance cutoff for the important partition
    pub importance_threshold: f64,

    /// Age after which entries leave the recent partition
    #[serde(with = "humantime_serde")]
    pub recent_max_age: Duration,

    /// Importance above which a trimmed recent entry is archived to
    /// summaries instead of dropped
    pub archive_min_importance: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("./data/memory"),
            max_recent: 100,
            max_important: 50,
            max_per_character: 30,
            importance_threshold: 0.7,
            recent_max_age: Duration::from_secs(24 * 60 * 60),
            archive_min_importance: 0.5,
        }
    }
}

impl MemoryConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage directory
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// Set the recent-partition cap
    pub fn with_max_recent(mut self, max: usize) -> Self {
        self.max_recent = max;
        self
    }

    /// Set the important-partition cap
    pub fn with_max_important(mut self, max: usize) -> Self {
        self.max_important = max;
        self
    }

    /// Set the per-character cap
    pub fn with_max_per_character(mut self, max: usize) -> Self {
        self.max_per_character = max;
        self
    }

    /// Set the importance cutoff for the important partition
    pub fn with_importance_threshold(mut self, threshold: f64) -> Self {
        self.importance_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}
