//! Error types for Fabula operations

/// Result type for Fabula operations
pub type Result<T> = std::result::Result<T, FabulaError>;

/// Error types for the Fabula engine
#[derive(Debug, thiserror::Error)]
pub enum FabulaError {
    /// Context budgeting error
    #[error("Context error: {0}")]
    Context(String),

    /// Memory store operation failed
    #[error("Memory error: {0}")]
    Memory(String),

    /// Durable storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// LLM collaborator error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for FabulaError {
    fn from(s: String) -> Self {
        FabulaError::Other(s)
    }
}

impl From<&str> for FabulaError {
    fn from(s: &str) -> Self {
        FabulaError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for FabulaError {
    fn from(err: anyhow::Error) -> Self {
        FabulaError::Other(err.to_string())
    }
}
