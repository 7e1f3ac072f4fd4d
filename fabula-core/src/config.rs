//! Configuration types for the Fabula engine

use serde::{Deserialize, Serialize};

use crate::context::ContextConfig;
use crate::memory::MemoryConfig;

/// Top-level configuration for the Fabula engine
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FabulaConfig {
    /// Context window budgeting configuration
    #[serde(default)]
    pub context: ContextConfig,

    /// Long-term memory store configuration
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl FabulaConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. Configuration file (fabula.toml or path from FABULA_CONFIG_PATH)
    /// 3. Environment variable overrides (FABULA_CONTEXT__MAX_TOKENS etc.)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is invalid or the merged
    /// configuration fails validation.
    pub fn load() -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Toml},
        };

        let mut figment = Figment::new()
            .merge(Toml::file("fabula.toml"))
            .merge(Env::prefixed("FABULA_").split("__"));

        // Check for custom config path
        if let Ok(path) = std::env::var("FABULA_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: FabulaConfig = figment.extract().map_err(|e| {
            crate::error::FabulaError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Toml},
        };

        let config: FabulaConfig =
            Figment::new()
                .merge(Toml::file(path))
                .extract()
                .map_err(|e| {
                    crate::error::FabulaError::Configuration(format!(
                        "Failed to load configuration file: {}",
                        e
                    ))
                })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if token reserves exceed the ceiling or any score
    /// threshold falls outside [0.0, 1.0].
    pub fn validate(&self) -> crate::error::Result<()> {
        let reserves = self.context.recent_token_reserve
            + self.context.character_token_reserve
            + self.context.world_token_reserve;
        if reserves > self.context.max_tokens {
            return Err(crate::error::FabulaError::Configuration(format!(
                "token reserves ({}) exceed max_tokens ({})",
                reserves, self.context.max_tokens
            )));
        }

        if !(0.0..=1.0).contains(&self.memory.importance_threshold) {
            return Err(crate::error::FabulaError::Configuration(format!(
                "importance_threshold must be in [0.0, 1.0], got {}",
                self.memory.importance_threshold
            )));
        }

        if !(0.0..=1.0).contains(&self.memory.archive_min_importance) {
            return Err(crate::error::FabulaError::Configuration(format!(
                "archive_min_importance must be in [0.0, 1.0], got {}",
                self.memory.archive_min_importance
            )));
        }

        if self.memory.max_recent == 0 {
            return Err(crate::error::FabulaError::Configuration(
                "max_recent must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for FabulaConfig
pub struct ConfigBuilder {
    config: FabulaConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            config: FabulaConfig::default(),
        }
    }

    /// Set context configuration
    pub fn context(mut self, config: ContextConfig) -> Self {
        self.config.context = config;
        self
    }

    /// Set memory configuration
    pub fn memory(mut self, config: MemoryConfig) -> Self {
        self.config.memory = config;
        self
    }

    /// Build the configuration
    pub fn build(self) -> FabulaConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
