//! Wire codec for bounds: delta-encoded timestamps and length-prefixed
//! id prefixes.
//!
//! Timestamps are encoded relative to the previous timestamp in the
//! same message. The caller owns the running value and resets it to
//! zero at each message boundary. The sentinel
//! [`TIMESTAMP_INFINITY`](crate::TIMESTAMP_INFINITY) encodes as varint
//! `0` and latches the decoder: once a terminal bound has been seen,
//! every later timestamp in the message decodes as the sentinel.

use crate::error::{CodecError, Result};
use crate::item::{Bound, Id, Item, ID_SIZE, TIMESTAMP_INFINITY};
use crate::varint::{decode_var_int, encode_var_int, take_bytes};

/// Append the delta encoding of `timestamp` to `buf`, updating the
/// running output timestamp.
pub fn encode_timestamp(buf: &mut Vec<u8>, timestamp: u64, last_out: &mut u64) {
    if timestamp == TIMESTAMP_INFINITY {
        *last_out = TIMESTAMP_INFINITY;
        encode_var_int(buf, 0);
        return;
    }

    // Bounds within a message are non-decreasing, so the delta fits.
    debug_assert!(timestamp >= *last_out);
    let delta = timestamp.saturating_sub(*last_out);
    *last_out = timestamp;
    encode_var_int(buf, delta + 1);
}

/// Decode a delta-encoded timestamp, updating the running input
/// timestamp.
pub fn decode_timestamp(input: &mut &[u8], last_in: &mut u64) -> Result<u64> {
    let raw = decode_var_int(input)?;

    if *last_in == TIMESTAMP_INFINITY {
        return Ok(TIMESTAMP_INFINITY);
    }
    if raw == 0 {
        *last_in = TIMESTAMP_INFINITY;
        return Ok(TIMESTAMP_INFINITY);
    }

    let timestamp = last_in.saturating_add(raw - 1);
    *last_in = timestamp;
    Ok(timestamp)
}

/// Append the wire encoding of a bound: timestamp delta, id-prefix
/// length, then the prefix bytes.
pub fn encode_bound(buf: &mut Vec<u8>, bound: &Bound, last_out: &mut u64) {
    encode_timestamp(buf, bound.item.timestamp, last_out);
    encode_var_int(buf, bound.id_len as u64);
    buf.extend_from_slice(&bound.item.id.0[..bound.id_len]);
}

/// Decode a bound, zero-padding the id prefix to full width.
pub fn decode_bound(input: &mut &[u8], last_in: &mut u64) -> Result<Bound> {
    let timestamp = decode_timestamp(input, last_in)?;

    let id_len = decode_var_int(input)? as usize;
    if id_len > ID_SIZE {
        return Err(CodecError::IdTooLong(id_len));
    }
    let prefix = take_bytes(input, id_len)?;

    Ok(Bound {
        item: Item::new(timestamp, Id::from_prefix(prefix)),
        id_len,
    })
}
