//! Order-independent range fingerprints.
//!
//! Ids in a range are summed into a 256-bit little-endian accumulator
//! (addition modulo 2^256), then digested together with the range size.
//! Addition commutes, so regrouping or reordering a range never changes
//! its fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::item::{Id, ID_SIZE};
use crate::varint::encode_var_int;

/// Width of a range fingerprint in bytes.
pub const FINGERPRINT_SIZE: usize = 16;

/// 16-byte digest of a range: its summed ids mixed with its size.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; FINGERPRINT_SIZE]);

impl Fingerprint {
    /// Create a fingerprint from raw bytes.
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; FINGERPRINT_SIZE] {
        &self.0
    }

    /// Convert to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 256-bit little-endian integer accumulator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulator {
    buf: [u8; ID_SIZE],
}

impl Accumulator {
    /// A zeroed accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset back to zero.
    pub fn reset(&mut self) {
        self.buf = [0u8; ID_SIZE];
    }

    /// Get the current 256-bit value, little-endian.
    pub const fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.buf
    }

    /// Add an id, modulo 2^256.
    pub fn add(&mut self, id: &Id) {
        self.add_bytes(&id.0);
    }

    fn add_bytes(&mut self, other: &[u8; ID_SIZE]) {
        let mut carry = false;
        for limb in 0..ID_SIZE / 8 {
            let offset = limb * 8;
            let mut word = [0u8; 8];
            word.copy_from_slice(&self.buf[offset..offset + 8]);
            let a = u64::from_le_bytes(word);
            word.copy_from_slice(&other[offset..offset + 8]);
            let b = u64::from_le_bytes(word);

            let (sum, overflow_a) = a.overflowing_add(b);
            let (sum, overflow_b) = sum.overflowing_add(u64::from(carry));
            carry = overflow_a || overflow_b;

            self.buf[offset..offset + 8].copy_from_slice(&sum.to_le_bytes());
        }
    }

    /// Replace the value with its additive inverse modulo 2^256, so
    /// that one range's accumulator can be subtracted from another's.
    pub fn negate(&mut self) {
        for byte in &mut self.buf {
            *byte = !*byte;
        }
        let mut one = [0u8; ID_SIZE];
        one[0] = 1;
        self.add_bytes(&one);
    }

    /// Digest the accumulated ids together with the range size:
    /// the first 16 bytes of `SHA-256(value || varint(size))`.
    pub fn fingerprint(&self, size: usize) -> Fingerprint {
        let mut size_buf = Vec::with_capacity(10);
        encode_var_int(&mut size_buf, size as u64);

        let mut hasher = Sha256::new();
        hasher.update(self.buf);
        hasher.update(&size_buf);
        let digest = hasher.finalize();

        let mut out = [0u8; FINGERPRINT_SIZE];
        out.copy_from_slice(&digest[..FINGERPRINT_SIZE]);
        Fingerprint(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_is_commutative() {
        let a = Id::from_bytes([0x17; ID_SIZE]);
        let b = Id::from_bytes([0xe3; ID_SIZE]);
        let c = Id::from_prefix(&[0x01, 0x02, 0x03]);

        let mut forward = Accumulator::new();
        forward.add(&a);
        forward.add(&b);
        forward.add(&c);

        let mut backward = Accumulator::new();
        backward.add(&c);
        backward.add(&a);
        backward.add(&b);

        assert_eq!(forward, backward);
        assert_eq!(forward.fingerprint(3), backward.fingerprint(3));
    }

    #[test]
    fn carry_propagates_across_limbs() {
        let mut acc = Accumulator::new();
        acc.add(&Id::from_bytes([0xff; ID_SIZE]));

        let mut one = [0u8; ID_SIZE];
        one[0] = 1;
        acc.add(&Id::from_bytes(one));

        // 2^256 - 1 plus 1 wraps to zero.
        assert_eq!(acc, Accumulator::new());
    }

    #[test]
    fn negate_is_additive_inverse() {
        let id = Id::from_bytes([0x5a; ID_SIZE]);

        let mut negated = Accumulator::new();
        negated.add(&id);
        negated.negate();

        negated.add(&id);
        assert_eq!(negated, Accumulator::new());
    }

    #[test]
    fn fingerprint_depends_on_size() {
        let mut acc = Accumulator::new();
        acc.add(&Id::from_bytes([0x42; ID_SIZE]));

        assert_ne!(acc.fingerprint(1), acc.fingerprint(2));
    }

    #[test]
    fn fingerprint_depends_on_contents() {
        let mut a = Accumulator::new();
        a.add(&Id::from_bytes([0x01; ID_SIZE]));

        let mut b = Accumulator::new();
        b.add(&Id::from_bytes([0x02; ID_SIZE]));

        assert_ne!(a.fingerprint(1), b.fingerprint(1));
    }

    #[test]
    fn reset_clears_state() {
        let mut acc = Accumulator::new();
        acc.add(&Id::from_bytes([0x99; ID_SIZE]));
        acc.reset();
        assert_eq!(acc, Accumulator::new());
    }
}
