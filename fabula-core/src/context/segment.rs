//! Token-priced context segments

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The buffer a segment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentCategory {
    /// Recent dialogue, chronological
    Recent,
    /// Character sheets, one per character
    Character,
    /// World state singleton
    World,
    /// Memories pulled into the context window
    Memory,
    /// Compressed summaries of archived content
    Summary,
}

/// A unit of prompt text with a token price and metadata.
///
/// Segments are immutable once created: updates replace the segment rather
/// than mutating it in place, so a segment's content, price, and importance
/// are stable for its whole lifetime inside a buffer.
///
/// Character and emotion tags are genuine sets; they serialize as sorted
/// sequences, so round-tripping does not preserve insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSegment {
    content: String,
    tokens: usize,
    timestamp: DateTime<Utc>,
    importance: f64,
    category: SegmentCategory,
    #[serde(default)]
    characters: BTreeSet<String>,
    #[serde(default)]
    emotions: BTreeSet<String>,
}

impl ContentSegment {
    /// Create a segment. Importance is clamped to [0.0, 1.0]; the token
    /// count is the caller's (the engine never re-tokenizes).
    pub fn new(
        content: impl Into<String>,
        tokens: usize,
        category: SegmentCategory,
        importance: f64,
    ) -> Self {
        Self {
            content: content.into(),
            tokens,
            timestamp: Utc::now(),
            importance: importance.clamp(0.0, 1.0),
            category,
            characters: BTreeSet::new(),
            emotions: BTreeSet::new(),
        }
    }

    /// Tag the characters involved
    pub fn with_characters<I, S>(mut self, characters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.characters = characters.into_iter().map(Into::into).collect();
        self
    }

    /// Tag the emotions involved
    pub fn with_emotions<I, S>(mut self, emotions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emotions = emotions.into_iter().map(Into::into).collect();
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tokens(&self) -> usize {
        self.tokens
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn importance(&self) -> f64 {
        self.importance
    }

    pub fn category(&self) -> SegmentCategory {
        self.category
    }

    pub fn characters(&self) -> &BTreeSet<String> {
        &self.characters
    }

    pub fn emotions(&self) -> &BTreeSet<String> {
        &self.emotions
    }

    /// Whether the segment is tagged with the character or mentions the name
    /// in its content (case-insensitive)
    pub fn mentions_character(&self, name: &str) -> bool {
        self.characters.contains(name)
            || self
                .content
                .to_lowercase()
                .contains(&name.to_lowercase())
    }
}
