//! Record keys and range separators.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of a record identifier in bytes.
pub const ID_SIZE: usize = 32;

/// Timestamp sentinel treated as "infinity" when used in a bound.
///
/// Encoders reserve this value for terminal bounds; real records must
/// stay below it (the wire format carries a 63-bit usable range).
pub const TIMESTAMP_INFINITY: u64 = u64::MAX;

/// A 32-byte opaque record identifier.
///
/// Ids compare lexicographically. The reconciliation protocol never
/// interprets their contents.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Id(pub [u8; ID_SIZE]);

impl Id {
    /// Create an id from raw bytes.
    pub const fn from_bytes(bytes: [u8; ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    /// Build a full-width id from a short prefix, padding the tail with
    /// zero bytes. Prefixes longer than [`ID_SIZE`] are truncated.
    pub fn from_prefix(prefix: &[u8]) -> Self {
        let len = prefix.len().min(ID_SIZE);
        let mut bytes = [0u8; ID_SIZE];
        bytes[..len].copy_from_slice(&prefix[..len]);
        Self(bytes)
    }

    /// Convert to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != ID_SIZE {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; ID_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The all-zero id.
    pub const ZERO: Self = Self([0u8; ID_SIZE]);
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Id {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ID_SIZE]> for Id {
    fn from(bytes: [u8; ID_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Id {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; ID_SIZE] = slice.try_into()?;
        Ok(Self(arr))
    }
}

/// A record key: `(timestamp, id)`, ordered lexicographically.
///
/// The derived ordering compares `timestamp` first and the id bytes
/// second, which is exactly the order a sealed storage keeps.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Item {
    pub timestamp: u64,
    pub id: Id,
}

impl Item {
    /// Create a key from its parts.
    pub const fn new(timestamp: u64, id: Id) -> Self {
        Self { timestamp, id }
    }

    /// The smallest possible key.
    pub const ZERO: Self = Self {
        timestamp: 0,
        id: Id::ZERO,
    };

    /// Terminal key: compares greater than every real record.
    pub const fn infinity() -> Self {
        Self {
            timestamp: TIMESTAMP_INFINITY,
            id: Id::ZERO,
        }
    }

    /// Whether this key is the terminal sentinel.
    pub const fn is_infinity(&self) -> bool {
        self.timestamp == TIMESTAMP_INFINITY
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinity() {
            write!(f, "Item(inf)")
        } else {
            write!(f, "Item({}, {})", self.timestamp, self.id)
        }
    }
}

/// An item-shaped separator carrying a possibly truncated id prefix.
///
/// The stored item keeps the prefix zero-padded to full width so bounds
/// compare directly against items; `id_len` records how many prefix
/// bytes actually travel on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bound {
    pub item: Item,
    pub id_len: usize,
}

impl Bound {
    /// The lower bound of the whole key space.
    pub const ZERO: Self = Self {
        item: Item::ZERO,
        id_len: 0,
    };

    /// Terminal upper bound; encodes with an empty id.
    pub const INFINITY: Self = Self {
        item: Item::infinity(),
        id_len: 0,
    };

    /// A bound carrying a full-width id.
    pub const fn from_item(item: Item) -> Self {
        Self {
            item,
            id_len: ID_SIZE,
        }
    }

    /// A bound on a bare timestamp.
    pub const fn from_timestamp(timestamp: u64) -> Self {
        Self {
            item: Item::new(timestamp, Id::ZERO),
            id_len: 0,
        }
    }

    /// Minimal separator strictly greater than `prev` and no greater
    /// than `curr`.
    ///
    /// When the timestamps differ the id is dropped entirely; otherwise
    /// the shortest distinguishing prefix of `curr`'s id is kept.
    /// Requires `prev < curr`.
    pub fn minimal(prev: &Item, curr: &Item) -> Self {
        if curr.timestamp != prev.timestamp {
            return Self::from_timestamp(curr.timestamp);
        }

        let shared = prev
            .id
            .0
            .iter()
            .zip(curr.id.0.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let id_len = (shared + 1).min(ID_SIZE);

        Self {
            item: Item::new(curr.timestamp, Id::from_prefix(&curr.id.0[..id_len])),
            id_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_with(bytes: &[u8]) -> Id {
        Id::from_prefix(bytes)
    }

    #[test]
    fn id_hex_roundtrip() {
        let id = Id::from_bytes([0x42; ID_SIZE]);
        let hex = id.to_hex();
        let recovered = Id::from_hex(&hex).unwrap();
        assert_eq!(id, recovered);
    }

    #[test]
    fn id_from_prefix_pads_right() {
        let id = Id::from_prefix(&[0xab, 0xcd]);
        assert_eq!(id.0[0], 0xab);
        assert_eq!(id.0[1], 0xcd);
        assert!(id.0[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn item_ordering_is_lexicographic() {
        let a = Item::new(1, id_with(&[0xff]));
        let b = Item::new(2, id_with(&[0x00]));
        let c = Item::new(2, id_with(&[0x01]));

        assert!(a < b);
        assert!(b < c);
        assert!(a < Item::infinity());
        assert!(c < Item::infinity());
    }

    #[test]
    fn minimal_bound_drops_id_when_timestamps_differ() {
        let prev = Item::new(5, id_with(&[0xaa]));
        let curr = Item::new(9, id_with(&[0xbb]));

        let bound = Bound::minimal(&prev, &curr);
        assert_eq!(bound.id_len, 0);
        assert_eq!(bound.item, Item::new(9, Id::ZERO));
        assert!(prev < bound.item && bound.item <= curr);
    }

    #[test]
    fn minimal_bound_keeps_shortest_distinguishing_prefix() {
        let prev = Item::new(5, id_with(&[0xaa, 0xbb, 0x01, 0x77]));
        let curr = Item::new(5, id_with(&[0xaa, 0xbb, 0x02, 0x33]));

        let bound = Bound::minimal(&prev, &curr);
        assert_eq!(bound.id_len, 3);
        assert_eq!(&bound.item.id.0[..3], &[0xaa, 0xbb, 0x02]);
        assert!(prev < bound.item && bound.item <= curr);
    }

    #[test]
    fn minimal_bound_single_byte_difference() {
        let prev = Item::new(7, id_with(&[0x10]));
        let curr = Item::new(7, id_with(&[0x20]));

        let bound = Bound::minimal(&prev, &curr);
        assert_eq!(bound.id_len, 1);
        assert_eq!(bound.item.id.0[0], 0x20);
    }
}
