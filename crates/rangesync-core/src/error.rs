//! Error types for the wire codec.

use thiserror::Error;

/// Errors raised while parsing wire data.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The buffer ended inside a varint or a fixed-width field.
    #[error("truncated input")]
    TruncatedInput,

    /// A varint encoded a value wider than 64 bits.
    #[error("varint overflows u64")]
    VarIntOverflow,

    /// A bound carried an id longer than 32 bytes.
    #[error("id length {0} exceeds 32 bytes")]
    IdTooLong(usize),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
