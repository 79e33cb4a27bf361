//! Error types for the reconciliation engine.

use thiserror::Error;

use crate::wire::limits;

/// Errors that can occur while driving a reconciliation conversation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Non-zero frame-size limit below the protocol minimum.
    #[error(
        "frame size limit {0} is below the minimum of {min}",
        min = limits::MIN_FRAME_SIZE_LIMIT
    )]
    FrameSizeLimitTooSmall(usize),

    /// Version byte outside the protocol's version window.
    #[error("invalid protocol version byte 0x{0:02x}")]
    InvalidVersion(u8),

    /// The peer speaks a valid but different protocol version.
    #[error("unsupported protocol version 0x{0:02x} requested by peer")]
    UnsupportedVersion(u8),

    /// Mode value outside the known range modes.
    #[error("unexpected range mode {0}")]
    UnexpectedMode(u64),

    /// `initiate` called more than once.
    #[error("reconciliation already initiated")]
    AlreadyInitiated,

    /// Structurally inconsistent message.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The engine refused further use after an earlier protocol error.
    #[error("engine poisoned by an earlier protocol error")]
    Poisoned,

    /// Wire data failed to parse.
    #[error("codec error: {0}")]
    Codec(#[from] rangesync_core::CodecError),

    /// Storage operation failed.
    #[error("store error: {0}")]
    Store(#[from] rangesync_store::StoreError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
