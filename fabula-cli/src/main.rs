//! Fabula CLI - Command-line tools for the long-term memory store

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use fabula_core::memory::{AddMemory, MemoryConfig, MemoryQuery, MemoryStore};

#[derive(Parser)]
#[command(name = "fabula")]
#[command(about = "Fabula narrative memory CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Storage directory for the memory snapshot
    #[arg(long, global = true, env = "FABULA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Memory store commands
    Memory {
        #[command(subcommand)]
        command: MemoryCommands,
    },
    /// Version information
    Version,
}

#[derive(Subcommand)]
enum MemoryCommands {
    /// Add a memory entry
    Add {
        /// Memory content
        content: String,
        /// Involved character (repeatable)
        #[arg(short, long = "character")]
        characters: Vec<String>,
        /// Emotion tag (repeatable)
        #[arg(short, long = "emotion")]
        emotions: Vec<String>,
        /// Topic tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Importance score in [0.0, 1.0]
        #[arg(short, long, default_value_t = 0.5)]
        importance: f64,
    },
    /// Search memories, ranked by relevance
    Search {
        /// Text to match against content and summaries
        query: Option<String>,
        /// Require an involved character (repeatable)
        #[arg(short, long = "character")]
        characters: Vec<String>,
        /// Require a topic tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Require an emotion (repeatable)
        #[arg(short, long = "emotion")]
        emotions: Vec<String>,
        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        /// Minimum importance
        #[arg(long, default_value_t = 0.0)]
        min_importance: f64,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compact old recent memories into a summary
    Compact {
        /// Age in days beyond which recent memories are compacted
        #[arg(short, long, default_value_t = 7)]
        days: i64,
    },
    /// Show store statistics
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("fabula {}", env!("CARGO_PKG_VERSION"));
            println!("fabula-core {}", fabula_core::VERSION);
        }
        Commands::Memory { command } => {
            let mut store = MemoryStore::open(memory_config(cli.data_dir));
            run_memory_command(&mut store, command)?;
        }
    }

    Ok(())
}

fn memory_config(data_dir: Option<PathBuf>) -> MemoryConfig {
    let dir = data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fabula")
            .join("memory")
    });
    MemoryConfig::new().with_storage_dir(dir)
}

fn run_memory_command(store: &mut MemoryStore, command: MemoryCommands) -> Result<()> {
    match command {
        MemoryCommands::Add {
            content,
            characters,
            emotions,
            tags,
            importance,
        } => {
            let options = AddMemory::new()
                .with_characters(characters)
                .with_emotions(emotions)
                .with_tags(tags)
                .with_importance(importance);
            match store.add_memory(content, options) {
                Some(entry) => println!("Added memory {}", &entry.content_hash[..12]),
                None => println!("Skipped: duplicate memory"),
            }
        }
        MemoryCommands::Search {
            query,
            characters,
            tags,
            emotions,
            limit,
            min_importance,
            json,
        } => {
            let mut criteria = MemoryQuery::new()
                .with_limit(limit)
                .with_min_importance(min_importance);
            if let Some(text) = query {
                criteria = criteria.with_text(text);
            }
            for character in characters {
                criteria = criteria.with_character(character);
            }
            for tag in tags {
                criteria = criteria.with_tag(tag);
            }
            for emotion in emotions {
                criteria = criteria.with_emotion(emotion);
            }

            let results = store.retrieve_memories(&criteria);
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No memories matched.");
            } else {
                for entry in results {
                    println!(
                        "[{:.2}] {} ({})",
                        entry.relevance(),
                        entry.content,
                        entry.created_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }
        MemoryCommands::Compact { days } => {
            let compacted = store.compress_old_memories(days);
            println!("Compacted {} memories", compacted);
        }
        MemoryCommands::Stats { json } => {
            let stats = store.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Storage dir: {}", stats.storage_dir.display());
                println!("Total entries: {}", stats.total_entries);
                println!("  recent:    {}", stats.recent);
                println!("  important: {}", stats.important);
                println!("  summaries: {}", stats.summaries);
                println!("Characters tracked: {}", stats.characters);
                for (name, count) in &stats.character_counts {
                    println!("  {}: {}", name, count);
                }
            }
        }
    }

    Ok(())
}
