//! Error types for the store module.

use rangesync_core::Id;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Mutation attempted after sealing.
    #[error("storage is already sealed")]
    AlreadySealed,

    /// Query attempted before sealing.
    #[error("storage is not sealed")]
    NotSealed,

    /// Two equal `(timestamp, id)` pairs were found at seal time.
    #[error("duplicate item at timestamp {timestamp}: {id}")]
    DuplicateItem { timestamp: u64, id: Id },

    /// Index outside the sealed item set.
    #[error("index {index} out of range for storage of size {size}")]
    OutOfRange { index: usize, size: usize },

    /// Malformed query range.
    #[error("invalid range [{begin}, {end}) for storage of size {size}")]
    InvalidRange {
        begin: usize,
        end: usize,
        size: usize,
    },
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
