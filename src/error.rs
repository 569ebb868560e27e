//! Error types for the ingestion pipeline

use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ingestion pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Partition service failed after exhausting the retry policy
    #[error("Partition service failed: {0}")]
    PartitionFailure(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Vision LLM error
    #[error("Vision LLM error: {0}")]
    Vision(String),

    /// Image sideband store error
    #[error("Image store error: {0}")]
    ImageStore(String),

    /// Blob storage error
    #[error("Blob store error: {0}")]
    BlobStore(String),

    /// Dataset store error
    #[error("Dataset store error: {0}")]
    DatasetStore(String),

    /// Team quota cannot accommodate the predicted training items
    #[error("Dataset quota exceeded: need {needed}, remaining {remaining}")]
    QuotaExceeded { needed: usize, remaining: usize },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a partition failure error
    pub fn partition(message: impl Into<String>) -> Self {
        Self::PartitionFailure(message.into())
    }

    /// Create a vision error
    pub fn vision(message: impl Into<String>) -> Self {
        Self::Vision(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
