//! Error types for AquaLink storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// The store's internal lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}
