use thiserror::Error;

/// Top-level error type for metro-minutes.
///
/// Subsystem crates define their own error types and implement
/// `From<MetroError>` so that the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MetroError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<toml::de::Error> for MetroError {
    fn from(err: toml::de::Error) -> Self {
        MetroError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MetroError {
    fn from(err: toml::ser::Error) -> Self {
        MetroError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MetroError {
    fn from(err: serde_json::Error) -> Self {
        MetroError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for metro-minutes operations.
pub type Result<T> = std::result::Result<T, MetroError>;
