//! # Rangesync Core
//!
//! Pure primitives for range-based set reconciliation: items, bounds,
//! the varint wire codec, and order-independent range fingerprints.
//!
//! This crate contains no I/O and no protocol state. It is pure
//! computation over keys and byte strings.
//!
//! ## Key Types
//!
//! - [`Id`] - Fixed-width 32-byte opaque record identifier
//! - [`Item`] - A record key: `(timestamp, id)`, ordered lexicographically
//! - [`Bound`] - An item-shaped separator that may carry a truncated id prefix
//! - [`Accumulator`] - 256-bit sum of ids, digested into a [`Fingerprint`]
//!
//! ## Varints
//!
//! Unsigned integers travel as big-endian 7-bit groups with a
//! continuation bit on every byte but the last:
//!
//! ```rust
//! use rangesync_core::{decode_var_int, encode_var_int};
//!
//! let mut buf = Vec::new();
//! encode_var_int(&mut buf, 300);
//! assert_eq!(buf, [0x82, 0x2c]);
//!
//! let mut input = buf.as_slice();
//! assert_eq!(decode_var_int(&mut input), Ok(300));
//! assert!(input.is_empty());
//! ```

pub mod accumulator;
pub mod codec;
pub mod error;
pub mod item;
pub mod varint;

pub use accumulator::{Accumulator, Fingerprint, FINGERPRINT_SIZE};
pub use codec::{decode_bound, decode_timestamp, encode_bound, encode_timestamp};
pub use error::CodecError;
pub use item::{Bound, Id, Item, ID_SIZE, TIMESTAMP_INFINITY};
pub use varint::{decode_var_int, encode_var_int, take_bytes};
