use thiserror::Error;

/// Quarry error types
#[derive(Error, Debug)]
pub enum SearchError {
    /// Wrong number of command-line arguments
    #[error("Usage error: {0}")]
    Usage(String),

    /// Unknown filter key or a value of the wrong type
    #[error("Filter error: {0}")]
    FilterParse(String),

    /// A single registry could not be searched
    #[error("Registry error: {registry} - {message}")]
    Registry { registry: String, message: String },

    /// No registry is available to search
    #[error("No registries to search: {0}")]
    NoRegistries(String),

    /// Output template could not be applied
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SearchError {
    fn from(err: toml::de::Error) -> Self {
        SearchError::Config(err.to_string())
    }
}

/// Result type alias for Quarry operations
pub type Result<T> = std::result::Result<T, SearchError>;
