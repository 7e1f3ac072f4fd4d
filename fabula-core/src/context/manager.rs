//! Context Manager Implementation
//!
//! The core ContextManager that holds categorized, token-priced buffers,
//! enforces the global token ceiling through a fixed three-stage compression
//! pipeline, and assembles the final prompt text in a stable section order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::ContextConfig;
use super::segment::{ContentSegment, SegmentCategory};

/// Segment counts per buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub recent: usize,
    pub characters: usize,
    pub world: usize,
    pub memories: usize,
    pub summaries: usize,
}

/// Token totals per buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTokens {
    pub recent: usize,
    pub characters: usize,
    pub world: usize,
    pub memories: usize,
    pub summaries: usize,
}

/// Snapshot of budget utilization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextStats {
    pub total_tokens: usize,
    pub max_tokens: usize,
    pub utilization: f64,
    pub segments: CategoryCounts,
    pub tokens_by_category: CategoryTokens,
}

/// Which buffer an eviction candidate lives in
#[derive(Debug, Clone, Copy)]
enum EvictableBuffer {
    Summary,
    Memory,
}

/// Token-budgeted context assembly across five categorized buffers.
///
/// Every mutation that adds content re-checks the ceiling and, when it is
/// exceeded, runs the compression pipeline synchronously before returning.
/// The contract is best-effort: if the protected floor (retained recent
/// dialogue, character sheets, world state, the first summary, the top two
/// memories) alone exceeds the ceiling, the manager logs a warning and
/// returns with the ceiling still exceeded rather than erroring, since the
/// LLM client will reject or truncate an oversized prompt itself.
pub struct ContextManager {
    config: ContextConfig,

    /// Recent dialogue, chronological
    recent: Vec<ContentSegment>,

    /// Character sheets, one segment per character
    character_sheets: Vec<ContentSegment>,

    /// World state singleton
    world_state: Option<ContentSegment>,

    /// Memories pulled into the context window
    memory_segments: Vec<ContentSegment>,

    /// Summaries of archived content
    summaries: Vec<ContentSegment>,
}

impl ContextManager {
    /// Create a new context manager
    pub fn new(config: ContextConfig) -> Self {
        info!(max_tokens = config.max_tokens, "initialized context manager");
        Self {
            config,
            recent: Vec::new(),
            character_sheets: Vec::new(),
            world_state: None,
            memory_segments: Vec::new(),
            summaries: Vec::new(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Append a message to recent dialogue.
    ///
    /// Runs the compression pipeline before returning if the total now
    /// exceeds the ceiling. Always succeeds.
    pub fn add_message(
        &mut self,
        content: impl Into<String>,
        tokens: usize,
        characters: &[String],
        emotions: &[String],
        importance: f64,
    ) {
        let segment = ContentSegment::new(content, tokens, SegmentCategory::Recent, importance)
            .with_characters(characters.iter().cloned())
            .with_emotions(emotions.iter().cloned());

        self.recent.push(segment);
        debug!(tokens, importance, "added message");

        if self.total_tokens() > self.config.max_tokens {
            self.compress();
        }
    }

    /// Set or replace a character sheet.
    ///
    /// Sheets carry importance 1.0 and are never eviction candidates; the
    /// only way one leaves the buffer is explicit replacement here.
    pub fn set_character_sheet(
        &mut self,
        character_name: &str,
        content: impl Into<String>,
        tokens: usize,
    ) {
        self.character_sheets
            .retain(|s| !s.characters().contains(character_name));

        let segment = ContentSegment::new(content, tokens, SegmentCategory::Character, 1.0)
            .with_characters([character_name]);
        self.character_sheets.push(segment);

        info!(character = character_name, tokens, "updated character sheet");
    }

    /// Replace the world state wholesale
    pub fn set_world_state(&mut self, content: impl Into<String>, tokens: usize) {
        self.world_state = Some(ContentSegment::new(
            content,
            tokens,
            SegmentCategory::World,
            0.9,
        ));
        info!(tokens, "updated world state");
    }

    /// Add a memory segment to the context window.
    ///
    /// This is the in-window copy; the durable record lives in the
    /// [`crate::memory::MemoryStore`].
    pub fn add_memory_segment(
        &mut self,
        content: impl Into<String>,
        tokens: usize,
        importance: f64,
    ) {
        let segment = ContentSegment::new(content, tokens, SegmentCategory::Memory, importance);
        self.memory_segments.push(segment);
        debug!(tokens, importance, "added memory segment");
    }

    /// Add a summary segment covering a described range of prior content
    pub fn add_summary(&mut self, content: impl Into<String>, tokens: usize, covered_range: &str) {
        let segment = ContentSegment::new(
            format!("[SUMMARY: {}]\n{}", covered_range, content.into()),
            tokens,
            SegmentCategory::Summary,
            0.6,
        );
        self.summaries.push(segment);
        info!(tokens, covered_range, "added summary");
    }

    /// Total tokens across all buffers
    pub fn total_tokens(&self) -> usize {
        let buffer_sum = |segments: &[ContentSegment]| -> usize {
            segments.iter().map(|s| s.tokens()).sum()
        };

        buffer_sum(&self.recent)
            + buffer_sum(&self.character_sheets)
            + self.world_state.as_ref().map(|s| s.tokens()).unwrap_or(0)
            + buffer_sum(&self.memory_segments)
            + buffer_sum(&self.summaries)
    }

    /// Run the compression pipeline.
    ///
    /// Stage order is fixed: recent dialogue is protected first because it is
    /// the highest-value, most time-sensitive content; memory and summary
    /// buffers are the pressure-release valves.
    fn compress(&mut self) {
        info!("starting context compression");

        let recent_tokens: usize = self.recent.iter().map(|s| s.tokens()).sum();
        if recent_tokens > self.config.recent_token_reserve {
            self.archive_old_messages();
        }

        if self.total_tokens() > self.config.max_tokens {
            self.compress_memories();
        }

        if self.total_tokens() > self.config.max_tokens {
            self.evict_low_importance();
        }

        let total = self.total_tokens();
        if total > self.config.max_tokens {
            warn!(
                total,
                max_tokens = self.config.max_tokens,
                "context still over ceiling after compression"
            );
        } else {
            info!(total, "context compression complete");
        }
    }

    /// Stage 1: fold the oldest recent dialogue into a placeholder summary.
    ///
    /// Keeps the newest `max(enough-for-reserve, 20)` segments. The summary
    /// text is a fixed-format notice; real summarization belongs to the LLM
    /// collaborator, whose output comes back through [`Self::add_summary`].
    fn archive_old_messages(&mut self) {
        if self.recent.len() <= 5 {
            return;
        }

        let mut keep_tokens = 0usize;
        let mut keep_count = 0usize;
        for segment in self.recent.iter().rev() {
            keep_tokens += segment.tokens();
            keep_count += 1;
            if keep_tokens >= self.config.recent_token_reserve && keep_count >= 20 {
                break;
            }
        }

        if keep_count < self.recent.len() {
            let split_at = self.recent.len() - keep_count;
            let archived: Vec<ContentSegment> = self.recent.drain(..split_at).collect();
            let archived_tokens: usize = archived.iter().map(|s| s.tokens()).sum();

            let notice = format!(
                "Summary of {} messages ({} tokens): Key events and character interactions from recent conversation.",
                archived.len(),
                archived_tokens
            );
            self.add_summary(
                notice,
                archived_tokens / 4,
                &format!("{} messages", archived.len()),
            );

            debug!(count = archived.len(), "archived messages to summary");
        }
    }

    /// Stage 2: fold low-importance memory segments beyond the top 10 into
    /// one summary
    fn compress_memories(&mut self) {
        if self.memory_segments.len() <= 3 {
            return;
        }

        self.memory_segments.sort_by(|a, b| {
            b.importance()
                .partial_cmp(&a.importance())
                .unwrap_or(Ordering::Equal)
        });

        if self.memory_segments.len() > 10 {
            let tail = self.memory_segments.split_off(10);
            let combined_tokens: usize = tail.iter().map(|s| s.tokens()).sum();
            let combined: String = tail
                .iter()
                .map(|s| s.content())
                .collect::<Vec<_>>()
                .join("\n");
            let excerpt: String = combined.chars().take(200).collect();

            self.add_summary(
                format!("Combined memories: {excerpt}..."),
                combined_tokens / 3,
                &format!("{} memories", tail.len()),
            );
        }
    }

    /// Stage 3: drop the least important summary/memory overflow.
    ///
    /// The first summary and the top two memory segments are protected;
    /// recent, character, and world buffers are never touched.
    fn evict_low_importance(&mut self) {
        let mut pool: Vec<(EvictableBuffer, usize, f64, usize)> = Vec::new();

        for (idx, segment) in self.summaries.iter().enumerate().skip(1) {
            pool.push((
                EvictableBuffer::Summary,
                idx,
                segment.importance(),
                segment.tokens(),
            ));
        }
        for (idx, segment) in self.memory_segments.iter().enumerate().skip(2) {
            pool.push((
                EvictableBuffer::Memory,
                idx,
                segment.importance(),
                segment.tokens(),
            ));
        }

        pool.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal));

        let mut total = self.total_tokens();
        let mut removed_tokens = 0usize;
        let mut drop_summaries: Vec<usize> = Vec::new();
        let mut drop_memories: Vec<usize> = Vec::new();

        for (buffer, idx, _, tokens) in pool {
            if total <= self.config.max_tokens {
                break;
            }
            total -= tokens;
            removed_tokens += tokens;
            match buffer {
                EvictableBuffer::Summary => drop_summaries.push(idx),
                EvictableBuffer::Memory => drop_memories.push(idx),
            }
        }

        drop_summaries.sort_unstable();
        for idx in drop_summaries.into_iter().rev() {
            self.summaries.remove(idx);
        }
        drop_memories.sort_unstable();
        for idx in drop_memories.into_iter().rev() {
            self.memory_segments.remove(idx);
        }

        if removed_tokens > 0 {
            warn!(removed_tokens, "removed low-importance content");
        }
    }

    /// Assemble the complete context for the LLM call.
    ///
    /// Fixed section order: system prompt, character sheets, world state,
    /// summaries, high-importance memories, then recent dialogue. Stable
    /// context leads and volatile dialogue trails, which conditions the model
    /// to treat the end of the prompt as "what just happened".
    pub fn build_context(&self, system_prompt: &str) -> String {
        let mut parts: Vec<String> = Vec::new();

        if !system_prompt.is_empty() {
            parts.push(system_prompt.to_string());
        }

        for segment in &self.character_sheets {
            parts.push(format!("[CHARACTER SHEET]\n{}", segment.content()));
        }

        if let Some(world) = &self.world_state {
            parts.push(format!("[WORLD STATE]\n{}", world.content()));
        }

        for segment in &self.summaries {
            parts.push(segment.content().to_string());
        }

        for segment in &self.memory_segments {
            if segment.importance() > 0.7 {
                parts.push(format!("[MEMORY]\n{}", segment.content()));
            }
        }

        for segment in &self.recent {
            parts.push(segment.content().to_string());
        }

        let context = parts.join("\n\n");
        info!(total_tokens = self.total_tokens(), "built context");
        context
    }

    /// Build a character-focused sub-context: the character's sheet, memory
    /// segments tagged with the name, and any of the last 10 recent segments
    /// mentioning the name
    pub fn get_character_context(&self, character_name: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();

        for segment in &self.character_sheets {
            if segment.characters().contains(character_name) {
                parts.push(segment.content());
            }
        }

        for segment in &self.memory_segments {
            if segment.characters().contains(character_name) {
                parts.push(segment.content());
            }
        }

        let start = self.recent.len().saturating_sub(10);
        for segment in &self.recent[start..] {
            if segment.mentions_character(character_name) {
                parts.push(segment.content());
            }
        }

        parts.join("\n\n")
    }

    /// Budget utilization snapshot
    pub fn stats(&self) -> ContextStats {
        let tokens = |segments: &[ContentSegment]| -> usize {
            segments.iter().map(|s| s.tokens()).sum()
        };
        let total_tokens = self.total_tokens();

        ContextStats {
            total_tokens,
            max_tokens: self.config.max_tokens,
            utilization: total_tokens as f64 / self.config.max_tokens as f64,
            segments: CategoryCounts {
                recent: self.recent.len(),
                characters: self.character_sheets.len(),
                world: usize::from(self.world_state.is_some()),
                memories: self.memory_segments.len(),
                summaries: self.summaries.len(),
            },
            tokens_by_category: CategoryTokens {
                recent: tokens(&self.recent),
                characters: tokens(&self.character_sheets),
                world: self.world_state.as_ref().map(|s| s.tokens()).unwrap_or(0),
                memories: tokens(&self.memory_segments),
                summaries: tokens(&self.summaries),
            },
        }
    }

    /// Recent-dialogue buffer (chronological)
    pub fn recent_segments(&self) -> &[ContentSegment] {
        &self.recent
    }

    /// Character-sheet buffer
    pub fn character_segments(&self) -> &[ContentSegment] {
        &self.character_sheets
    }

    /// World-state singleton
    pub fn world_segment(&self) -> Option<&ContentSegment> {
        self.world_state.as_ref()
    }

    /// In-window memory buffer
    pub fn memory_segments(&self) -> &[ContentSegment] {
        &self.memory_segments
    }

    /// Summary buffer (insertion order)
    pub fn summary_segments(&self) -> &[ContentSegment] {
        &self.summaries
    }
}
