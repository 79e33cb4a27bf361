//! On-wire protocol constants and range modes.

use crate::error::EngineError;

/// Protocol version spoken by this implementation.
pub const PROTOCOL_VERSION: u8 = 0x61;

/// Window of version bytes that identify this protocol family at all.
/// A first byte outside this range is not a reconciliation message.
pub const VERSION_WINDOW: std::ops::RangeInclusive<u8> = 0x60..=0x6F;

/// Number of buckets a disagreeing range is split into.
pub(crate) const BUCKETS: usize = 16;

/// Message size limits.
pub mod limits {
    /// Smallest legal frame-size limit. Zero disables the limit.
    pub const MIN_FRAME_SIZE_LIMIT: usize = 4096;

    /// Slack kept below the frame-size limit, reserving room for the
    /// trailing fingerprint record and its sentinel bound.
    pub const FRAME_SIZE_MARGIN: usize = 200;
}

/// Range modes: how a record describes its half-open range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The range needs no further work.
    Skip = 0,
    /// The range is summarised by a 16-byte fingerprint.
    Fingerprint = 1,
    /// The range's ids are listed in full.
    IdList = 2,
}

impl TryFrom<u64> for Mode {
    type Error = EngineError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Mode::Skip),
            1 => Ok(Mode::Fingerprint),
            2 => Ok(Mode::IdList),
            other => Err(EngineError::UnexpectedMode(other)),
        }
    }
}
