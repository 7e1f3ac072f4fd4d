//! Long-term memory store implementation
//!
//! Partitioned, deduplicated storage for durable memory entries with
//! time-decay relevance ranking, trim-on-write bounds, periodic compaction
//! into summaries, and a full-state JSON snapshot on every mutation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;

use super::config::MemoryConfig;
use super::entry::{content_hash, MemoryEntry};
use super::tags::extract_tags;

/// Options for adding a memory entry
#[derive(Debug, Clone)]
pub struct AddMemory {
    characters: Vec<String>,
    emotions: Vec<String>,
    tags: Vec<String>,
    importance: f64,
    context_key: String,
    extra: BTreeMap<String, serde_json::Value>,
}

impl Default for AddMemory {
    fn default() -> Self {
        Self {
            characters: Vec::new(),
            emotions: Vec::new(),
            tags: Vec::new(),
            importance: 0.5,
            context_key: String::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl AddMemory {
    /// Create empty options (importance 0.5, no tags)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an involved character
    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.characters.push(character.into());
        self
    }

    /// Add multiple involved characters
    pub fn with_characters(mut self, characters: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.characters
            .extend(characters.into_iter().map(Into::into));
        self
    }

    /// Add an emotion tag
    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotions.push(emotion.into());
        self
    }

    /// Add multiple emotion tags
    pub fn with_emotions(mut self, emotions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.emotions.extend(emotions.into_iter().map(Into::into));
        self
    }

    /// Add a topic tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add multiple topic tags
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set the importance score (clamped to [0.0, 1.0])
    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = importance.clamp(0.0, 1.0);
        self
    }

    /// Set the external context key folded into the dedup hash
    pub fn with_context_key(mut self, key: impl Into<String>) -> Self {
        self.context_key = key.into();
        self
    }

    /// Attach an unmodeled property
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Criteria for ranked memory retrieval
#[derive(Debug, Clone)]
pub struct MemoryQuery {
    text: String,
    characters: Vec<String>,
    tags: Vec<String>,
    emotions: Vec<String>,
    limit: usize,
    min_importance: f64,
}

impl Default for MemoryQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            characters: Vec::new(),
            tags: Vec::new(),
            emotions: Vec::new(),
            limit: 10,
            min_importance: 0.0,
        }
    }
}

impl MemoryQuery {
    /// Match everything, ranked by relevance, top 10
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a case-insensitive substring match on content or summary
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Require at least one shared character
    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.characters.push(character.into());
        self
    }

    /// Require at least one shared tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Require at least one shared emotion
    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotions.push(emotion.into());
        self
    }

    /// Set the maximum number of results
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the minimum importance
    pub fn with_min_importance(mut self, min: f64) -> Self {
        self.min_importance = min;
        self
    }
}

/// Memory store statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_entries: usize,
    pub recent: usize,
    pub important: usize,
    pub summaries: usize,
    pub characters: usize,
    pub character_counts: BTreeMap<String, usize>,
    pub storage_dir: PathBuf,
}

/// Persisted snapshot document
#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    recent: Vec<MemoryEntry>,
    #[serde(default)]
    important: Vec<MemoryEntry>,
    #[serde(default)]
    summaries: Vec<MemoryEntry>,
    #[serde(default)]
    characters: HashMap<String, Vec<MemoryEntry>>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    recent: &'a [MemoryEntry],
    important: &'a [MemoryEntry],
    summaries: &'a [MemoryEntry],
    characters: &'a HashMap<String, Vec<MemoryEntry>>,
}

/// Durable, deduplicated long-term memory store.
///
/// Partitions are indexing views, not ownership: one logical entry may sit in
/// `recent`, `important`, and several per-character lists at once, identified
/// across views by its content hash. `summaries` is the terminal archive.
///
/// Single-writer by contract. Every mutation persists a full-state snapshot;
/// persistence failures are logged and swallowed, and the in-memory state
/// stays authoritative for the session.
pub struct MemoryStore {
    config: MemoryConfig,
    recent: Vec<MemoryEntry>,
    important: Vec<MemoryEntry>,
    characters: HashMap<String, Vec<MemoryEntry>>,
    summaries: Vec<MemoryEntry>,
}

impl MemoryStore {
    /// Open a store, loading any existing snapshot from the storage
    /// directory. Unreadable snapshots are logged and ignored; the store
    /// then starts empty.
    pub fn open(config: MemoryConfig) -> Self {
        if let Err(e) = fs::create_dir_all(&config.storage_dir) {
            warn!(dir = %config.storage_dir.display(), error = %e, "failed to create storage dir");
        }

        let mut store = Self {
            config,
            recent: Vec::new(),
            important: Vec::new(),
            characters: HashMap::new(),
            summaries: Vec::new(),
        };
        store.load();

        info!(
            dir = %store.config.storage_dir.display(),
            recent = store.recent.len(),
            important = store.important.len(),
            summaries = store.summaries.len(),
            "opened memory store"
        );
        store
    }

    /// Get the configuration
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Add a memory entry.
    ///
    /// Returns `None` when an entry with the same content hash already exists
    /// in the recent, important, or summaries partition (a defined no-op, not
    /// an error). Per-character partitions are not consulted for
    /// deduplication.
    pub fn add_memory(&mut self, content: impl Into<String>, options: AddMemory) -> Option<MemoryEntry> {
        let content = content.into();
        let hash = content_hash(&content, &options.context_key);

        if self.is_duplicate(&hash) {
            debug!("skipping duplicate memory");
            return None;
        }

        let mut tags = options.tags;
        tags.extend(extract_tags(&content));

        let entry = MemoryEntry {
            content,
            created_at: Utc::now(),
            importance: options.importance,
            characters: options.characters,
            emotions: options.emotions,
            tags,
            content_hash: hash,
            summary: None,
            extra: options.extra,
        };

        self.recent.push(entry.clone());

        if entry.importance >= self.config.importance_threshold {
            self.important.push(entry.clone());
        }

        for character in &entry.characters {
            self.characters
                .entry(character.clone())
                .or_default()
                .push(entry.clone());
        }

        self.trim();
        self.save();

        debug!(
            chars = entry.content.len(),
            importance = entry.importance,
            "added memory"
        );
        Some(entry)
    }

    /// Whether the hash exists in the globally deduplicated partitions
    fn is_duplicate(&self, hash: &str) -> bool {
        self.recent
            .iter()
            .chain(&self.important)
            .chain(&self.summaries)
            .any(|m| m.content_hash == hash)
    }

    /// Retrieve memories matching the query, ranked by blended
    /// importance-and-recency relevance, best first
    pub fn retrieve_memories(&self, query: &MemoryQuery) -> Vec<MemoryEntry> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut matched: Vec<&MemoryEntry> = Vec::new();

        for entry in self
            .recent
            .iter()
            .chain(&self.important)
            .chain(&self.summaries)
        {
            if !seen.insert(entry.content_hash.as_str()) {
                continue;
            }
            if entry.importance < query.min_importance {
                continue;
            }
            if !query.characters.is_empty()
                && !query.characters.iter().any(|c| entry.characters.contains(c))
            {
                continue;
            }
            if !query.tags.is_empty() && !query.tags.iter().any(|t| entry.tags.contains(t)) {
                continue;
            }
            if !query.emotions.is_empty()
                && !query.emotions.iter().any(|e| entry.emotions.contains(e))
            {
                continue;
            }
            if !query.text.is_empty() && !entry.matches_query(&query.text) {
                continue;
            }
            matched.push(entry);
        }

        matched.sort_by(|a, b| {
            b.relevance()
                .partial_cmp(&a.relevance())
                .unwrap_or(Ordering::Equal)
        });

        matched.into_iter().take(query.limit).cloned().collect()
    }

    /// A character's memories, best first by (importance, recency)
    pub fn get_character_memories(&self, character: &str, limit: usize) -> Vec<MemoryEntry> {
        let Some(entries) = self.characters.get(character) else {
            return Vec::new();
        };

        let mut entries = entries.clone();
        entries.sort_by(rank_by_importance_then_time);
        entries.truncate(limit);
        entries
    }

    /// Build a structured text summary of a batch of entries: up to five
    /// high-importance bullets, up to three from the last day, and the
    /// involved characters. Truncated to `target_length` characters.
    pub fn summarize_memories(&self, entries: &[MemoryEntry], target_length: usize) -> String {
        if entries.is_empty() {
            return String::new();
        }

        let mut sections: Vec<String> = Vec::new();

        let key_events: Vec<String> = entries
            .iter()
            .filter(|m| m.importance > 0.7)
            .take(5)
            .map(|m| bullet_excerpt(&m.content))
            .collect();
        if !key_events.is_empty() {
            sections.push(format!("Key Events:\n{}", key_events.join("\n")));
        }

        let recent_events: Vec<String> = entries
            .iter()
            .filter(|m| m.age_hours() < 24.0)
            .take(3)
            .map(|m| bullet_excerpt(&m.content))
            .collect();
        if !recent_events.is_empty() {
            sections.push(format!("Recent Events:\n{}", recent_events.join("\n")));
        }

        let involved: BTreeSet<&str> = entries
            .iter()
            .flat_map(|m| m.characters.iter().map(String::as_str))
            .collect();
        if !involved.is_empty() {
            let names: Vec<&str> = involved.into_iter().collect();
            sections.push(format!("Characters involved: {}", names.join(", ")));
        }

        let summary = sections.join("\n\n");
        if summary.chars().count() > target_length {
            let truncated: String = summary.chars().take(target_length.saturating_sub(3)).collect();
            format!("{truncated}...")
        } else {
            summary
        }
    }

    /// Compact recent entries older than `days_old` into one summary entry.
    ///
    /// Only the recent partition ages out this way; important and
    /// per-character entries are assumed already curated and stay untouched.
    /// Returns the number of entries compacted.
    pub fn compress_old_memories(&mut self, days_old: i64) -> usize {
        let cutoff = Utc::now() - chrono::Duration::days(days_old);

        let (old, kept): (Vec<MemoryEntry>, Vec<MemoryEntry>) = self
            .recent
            .drain(..)
            .partition(|m| m.created_at < cutoff);
        self.recent = kept;

        if old.is_empty() {
            return 0;
        }

        let summary_text = self.summarize_memories(&old, 500);

        let characters: BTreeSet<String> =
            old.iter().flat_map(|m| m.characters.iter().cloned()).collect();
        let emotions: BTreeSet<String> =
            old.iter().flat_map(|m| m.emotions.iter().cloned()).collect();
        let mut tags = vec!["summary".to_string()];
        let unioned: BTreeSet<String> = old.iter().flat_map(|m| m.tags.iter().cloned()).collect();
        tags.extend(unioned);

        let entry = MemoryEntry {
            content: format!(
                "[COMPRESSED SUMMARY - {} memories from {}]\n{}",
                old.len(),
                cutoff.date_naive(),
                summary_text
            ),
            created_at: Utc::now(),
            importance: 0.6,
            characters: characters.into_iter().collect(),
            emotions: emotions.into_iter().collect(),
            tags,
            content_hash: content_hash(&summary_text, ""),
            summary: Some(summary_text),
            extra: BTreeMap::new(),
        };
        self.summaries.push(entry);

        info!(count = old.len(), "compressed old memories into summary");
        self.save();

        old.len()
    }

    /// Enforce partition bounds after an insert.
    ///
    /// Recent: age filter, then newest-first count cap; evictees above the
    /// archive cutoff land in summaries, the rest are dropped. Important:
    /// excess always archived. Per-character: excess dropped, never archived.
    fn trim(&mut self) {
        self.recent.retain(|m| {
            Utc::now()
                .signed_duration_since(m.created_at)
                .to_std()
                .map(|age| age < self.config.recent_max_age)
                .unwrap_or(true)
        });

        if self.recent.len() > self.config.max_recent {
            self.recent
                .sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let excess = self.recent.split_off(self.config.max_recent);
            for entry in excess {
                if entry.importance > self.config.archive_min_importance {
                    self.summaries.push(entry);
                }
            }
        }

        if self.important.len() > self.config.max_important {
            self.important.sort_by(|a, b| {
                b.importance
                    .partial_cmp(&a.importance)
                    .unwrap_or(Ordering::Equal)
            });
            let excess = self.important.split_off(self.config.max_important);
            self.summaries.extend(excess);
        }

        for entries in self.characters.values_mut() {
            if entries.len() > self.config.max_per_character {
                entries.sort_by(rank_by_importance_then_time);
                entries.truncate(self.config.max_per_character);
            }
        }
    }

    /// Persist the full-state snapshot; failures are logged and swallowed
    fn save(&self) {
        if let Err(e) = self.try_save() {
            warn!(error = %e, "failed to save memories");
        } else {
            debug!("saved memories to disk");
        }
    }

    fn try_save(&self) -> Result<()> {
        let snapshot = SnapshotRef {
            recent: &self.recent,
            important: &self.important,
            summaries: &self.summaries,
            characters: &self.characters,
        };
        let json = serde_json::to_string_pretty(&snapshot)?;

        // Write-to-temp-then-rename so a crash mid-write cannot corrupt the
        // previously committed snapshot.
        let path = self.snapshot_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn load(&mut self) {
        if !self.snapshot_path().exists() {
            return;
        }
        match self.try_load() {
            Ok(snapshot) => {
                self.recent = snapshot.recent;
                self.important = snapshot.important;
                self.summaries = snapshot.summaries;
                self.characters = snapshot.characters;
            }
            Err(e) => warn!(error = %e, "failed to load memories"),
        }
    }

    fn try_load(&self) -> Result<Snapshot> {
        let data = fs::read_to_string(self.snapshot_path())?;
        Ok(serde_json::from_str(&data)?)
    }

    fn snapshot_path(&self) -> PathBuf {
        self.config.storage_dir.join("memories.json")
    }

    /// Store statistics
    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            total_entries: self.recent.len() + self.important.len() + self.summaries.len(),
            recent: self.recent.len(),
            important: self.important.len(),
            summaries: self.summaries.len(),
            characters: self.characters.len(),
            character_counts: self
                .characters
                .iter()
                .map(|(name, entries)| (name.clone(), entries.len()))
                .collect(),
            storage_dir: self.config.storage_dir.clone(),
        }
    }

    /// Summary-partition entries (terminal archive), insertion order
    pub fn summary_entries(&self) -> &[MemoryEntry] {
        &self.summaries
    }

    /// Recent-partition entries, insertion order
    pub fn recent_entries(&self) -> &[MemoryEntry] {
        &self.recent
    }

    /// Important-partition entries
    pub fn important_entries(&self) -> &[MemoryEntry] {
        &self.important
    }
}

/// Descending (importance, creation time) ordering
fn rank_by_importance_then_time(a: &MemoryEntry, b: &MemoryEntry) -> Ordering {
    b.importance
        .partial_cmp(&a.importance)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// First 100 characters of the content as a bullet line
fn bullet_excerpt(content: &str) -> String {
    let excerpt: String = content.chars().take(100).collect();
    format!("\u{2022} {excerpt}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> MemoryStore {
        MemoryStore::open(MemoryConfig::new().with_storage_dir(temp.path()))
    }

    #[test]
    fn test_duplicate_add_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        let mut store = store(&temp);

        let first = store.add_memory("Rem fought the whale", AddMemory::new());
        let second = store.add_memory("Rem fought the whale", AddMemory::new());

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(store.stats().recent, 1);
    }

    #[test]
    fn test_context_key_distinguishes_duplicates() {
        let temp = TempDir::new().unwrap();
        let mut store = store(&temp);

        let a = store.add_memory("She nodded", AddMemory::new().with_context_key("scene-1"));
        let b = store.add_memory("She nodded", AddMemory::new().with_context_key("scene-2"));

        assert!(a.is_some());
        assert!(b.is_some());
        assert_eq!(store.stats().recent, 2);
    }

    #[test]
    fn test_auto_tagging() {
        let temp = TempDir::new().unwrap();
        let mut store = store(&temp);

        let entry = store
            .add_memory(
                "A fierce battle broke out at the gate",
                AddMemory::new().with_tag("prologue"),
            )
            .unwrap();

        assert!(entry.tags.contains(&"prologue".to_string()));
        assert!(entry.tags.contains(&"combat".to_string()));
    }

    #[test]
    fn test_important_partition_threshold() {
        let temp = TempDir::new().unwrap();
        let mut store = store(&temp);

        store.add_memory("major event", AddMemory::new().with_importance(0.9));
        store.add_memory("minor event", AddMemory::new().with_importance(0.4));

        let stats = store.stats();
        assert_eq!(stats.recent, 2);
        assert_eq!(stats.important, 1);
        assert_eq!(store.important_entries()[0].content, "major event");
    }

    #[test]
    fn test_relevance_orders_by_importance_at_equal_age() {
        let temp = TempDir::new().unwrap();
        let mut store = store(&temp);

        store.add_memory("event a", AddMemory::new().with_importance(0.9));
        store.add_memory("event b", AddMemory::new().with_importance(0.3));
        store.add_memory("event c", AddMemory::new().with_importance(0.6));

        let results = store.retrieve_memories(&MemoryQuery::new().with_limit(3));
        let importances: Vec<f64> = results.iter().map(|m| m.importance).collect();
        assert_eq!(importances, vec![0.9, 0.6, 0.3]);
    }

    #[test]
    fn test_retrieval_filters() {
        let temp = TempDir::new().unwrap();
        let mut store = store(&temp);

        store.add_memory(
            "Rem and the whale",
            AddMemory::new()
                .with_character("Rem")
                .with_emotion("fear")
                .with_importance(0.8),
        );
        store.add_memory(
            "A quiet market day",
            AddMemory::new().with_character("Otto").with_importance(0.2),
        );

        let by_character =
            store.retrieve_memories(&MemoryQuery::new().with_character("Rem"));
        assert_eq!(by_character.len(), 1);
        assert_eq!(by_character[0].content, "Rem and the whale");

        let by_emotion = store.retrieve_memories(&MemoryQuery::new().with_emotion("fear"));
        assert_eq!(by_emotion.len(), 1);

        let by_text = store.retrieve_memories(&MemoryQuery::new().with_text("MARKET"));
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].content, "A quiet market day");

        let by_importance =
            store.retrieve_memories(&MemoryQuery::new().with_min_importance(0.5));
        assert_eq!(by_importance.len(), 1);
        assert_eq!(by_importance[0].content, "Rem and the whale");

        let no_match = store.retrieve_memories(&MemoryQuery::new().with_tag("nonexistent"));
        assert!(no_match.is_empty());
    }

    #[test]
    fn test_per_character_excess_dropped_not_archived() {
        let temp = TempDir::new().unwrap();
        let mut store = MemoryStore::open(
            MemoryConfig::new()
                .with_storage_dir(temp.path())
                .with_max_per_character(30),
        );

        for i in 0..35 {
            store.add_memory(
                format!("Bob event {i}"),
                AddMemory::new()
                    .with_character("Bob")
                    .with_importance(0.01 * i as f64),
            );
        }

        let memories = store.get_character_memories("Bob", 100);
        assert_eq!(memories.len(), 30);
        // The five lowest-ranked entries are gone, not archived.
        assert!(memories.iter().all(|m| m.importance >= 0.05 - 1e-9));
        assert!(store.summary_entries().is_empty());
    }

    #[test]
    fn test_recent_trim_archives_only_above_cutoff() {
        let temp = TempDir::new().unwrap();
        let mut store = MemoryStore::open(
            MemoryConfig::new()
                .with_storage_dir(temp.path())
                .with_max_recent(5),
        );

        // Above the archive cutoff (0.5) but below the important threshold.
        for i in 0..8 {
            store.add_memory(format!("notable {i}"), AddMemory::new().with_importance(0.6));
        }
        assert_eq!(store.stats().recent, 5);
        assert_eq!(store.summary_entries().len(), 3);

        // Below the archive cutoff: trimmed entries vanish.
        let temp2 = TempDir::new().unwrap();
        let mut store2 = MemoryStore::open(
            MemoryConfig::new()
                .with_storage_dir(temp2.path())
                .with_max_recent(5),
        );
        for i in 0..8 {
            store2.add_memory(format!("trivial {i}"), AddMemory::new().with_importance(0.3));
        }
        assert_eq!(store2.stats().recent, 5);
        assert!(store2.summary_entries().is_empty());
    }

    #[test]
    fn test_important_trim_archives_unconditionally() {
        let temp = TempDir::new().unwrap();
        let mut store = MemoryStore::open(
            MemoryConfig::new()
                .with_storage_dir(temp.path())
                .with_max_important(3),
        );

        for i in 0..5 {
            store.add_memory(
                format!("crucial {i}"),
                AddMemory::new().with_importance(0.7 + 0.05 * i as f64),
            );
        }

        let stats = store.stats();
        assert_eq!(stats.important, 3);
        assert_eq!(stats.summaries, 2);
        // The kept three are the most important.
        assert!(store.important_entries().iter().all(|m| m.importance >= 0.8 - 1e-9));
    }

    #[test]
    fn test_per_character_partition_not_deduplicated() {
        let temp = TempDir::new().unwrap();
        let mut store = store(&temp);

        store.add_memory("shared scene", AddMemory::new().with_character("Rem"));
        // Global dedup rejects the second insert entirely, so Rem's partition
        // still holds one copy; per-character lists are never scanned.
        assert!(store
            .add_memory("shared scene", AddMemory::new().with_character("Rem"))
            .is_none());
        assert_eq!(store.get_character_memories("Rem", 10).len(), 1);
    }

    #[test]
    fn test_summarize_memories_sections() {
        let temp = TempDir::new().unwrap();
        let mut store = store(&temp);

        let a = store
            .add_memory(
                "The duel at dawn changed everything",
                AddMemory::new().with_character("Rem").with_importance(0.9),
            )
            .unwrap();
        let b = store
            .add_memory(
                "A quiet breakfast",
                AddMemory::new().with_character("Emilia").with_importance(0.2),
            )
            .unwrap();

        let summary = store.summarize_memories(&[a, b], 500);
        assert!(summary.contains("Key Events:"));
        assert!(summary.contains("\u{2022} The duel at dawn"));
        assert!(summary.contains("Recent Events:"));
        assert!(summary.contains("Characters involved: Emilia, Rem"));
    }

    #[test]
    fn test_summarize_memories_truncates() {
        let temp = TempDir::new().unwrap();
        let mut store = store(&temp);

        let entries: Vec<MemoryEntry> = (0..5)
            .filter_map(|i| {
                store.add_memory(
                    format!("event {i}: {}", "x".repeat(120)),
                    AddMemory::new().with_importance(0.9),
                )
            })
            .collect();

        let summary = store.summarize_memories(&entries, 100);
        assert!(summary.chars().count() <= 100);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_compress_old_memories() {
        let temp = TempDir::new().unwrap();
        let mut store = store(&temp);

        store.add_memory("fresh event", AddMemory::new());
        // Backdate two entries past the compaction threshold.
        for i in 0..2 {
            let mut entry = store
                .add_memory(
                    format!("ancient event {i}"),
                    AddMemory::new().with_character("Rem").with_emotion("fear"),
                )
                .unwrap();
            entry.created_at = Utc::now() - chrono::Duration::days(10);
            let slot = store
                .recent
                .iter_mut()
                .find(|m| m.content_hash == entry.content_hash)
                .unwrap();
            *slot = entry;
        }

        let compressed = store.compress_old_memories(7);
        assert_eq!(compressed, 2);
        assert_eq!(store.stats().recent, 1);

        let summary = store.summary_entries().last().unwrap();
        assert!(summary.content.starts_with("[COMPRESSED SUMMARY - 2 memories from "));
        assert!(summary.summary.is_some());
        assert_eq!(summary.importance, 0.6);
        assert!(summary.tags.contains(&"summary".to_string()));
        assert_eq!(summary.characters, vec!["Rem".to_string()]);
        assert_eq!(summary.emotions, vec!["fear".to_string()]);

        // Nothing old left to compact.
        assert_eq!(store.compress_old_memories(7), 0);
    }

    #[test]
    fn test_persistence_round_trip() {
        let temp = TempDir::new().unwrap();
        {
            let mut store = store(&temp);
            store.add_memory(
                "Rem fought the whale",
                AddMemory::new().with_character("Rem").with_importance(0.9),
            );
            store.add_memory("A quiet market day", AddMemory::new());
        }

        let reopened = MemoryStore::open(MemoryConfig::new().with_storage_dir(temp.path()));
        let results = reopened.retrieve_memories(&MemoryQuery::new());

        let mut hashes: Vec<&str> = results.iter().map(|m| m.content_hash.as_str()).collect();
        hashes.sort_unstable();
        let mut expected = vec![
            content_hash("Rem fought the whale", ""),
            content_hash("A quiet market day", ""),
        ];
        expected.sort();
        assert_eq!(hashes, expected.iter().map(String::as_str).collect::<Vec<_>>());

        assert_eq!(reopened.get_character_memories("Rem", 10).len(), 1);
    }

    #[test]
    fn test_corrupt_snapshot_is_swallowed() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("memories.json"), "not json").unwrap();

        let store = store(&temp);
        assert_eq!(store.stats().total_entries, 0);
    }

    #[test]
    fn test_stats() {
        let temp = TempDir::new().unwrap();
        let mut store = store(&temp);

        store.add_memory("a", AddMemory::new().with_character("Rem").with_importance(0.9));
        store.add_memory("b", AddMemory::new().with_character("Rem"));

        let stats = store.stats();
        assert_eq!(stats.total_entries, 3); // 2 recent + 1 important view
        assert_eq!(stats.recent, 2);
        assert_eq!(stats.important, 1);
        assert_eq!(stats.characters, 1);
        assert_eq!(stats.character_counts.get("Rem"), Some(&2));
    }
}
