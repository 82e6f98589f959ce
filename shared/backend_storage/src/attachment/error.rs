//! Error types for attachment storage operations

use thiserror::Error;

/// Result type for attachment storage operations
pub type AttachmentStorageResult<T> = Result<T, AttachmentStorageError>;

/// Errors that can occur during attachment storage operations
#[derive(Error, Debug)]
pub enum AttachmentStorageError {
    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// Presigning configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
