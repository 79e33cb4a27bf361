//! Storage trait: the abstract read interface over a sealed item set.
//!
//! This trait keeps the reconciliation engine storage-agnostic. The
//! in-tree implementation is [`VectorStorage`](crate::VectorStorage);
//! callers backed by their own indexes can implement it directly.

use rangesync_core::{Accumulator, Fingerprint, Item};

use crate::error::Result;

/// Read interface over a sealed, ordered multiset of items.
///
/// # Design Notes
///
/// - **Sealed only**: every method requires a sealed storage and fails
///   with `NotSealed` otherwise.
/// - **Half-open ranges**: `[begin, end)` index ranges, with
///   `begin <= end <= size`.
/// - **Shared fingerprints**: `fingerprint` is a provided method built
///   on `iterate`, so every backend produces byte-identical digests
///   for the same range contents.
pub trait Storage {
    /// Number of items in the sealed set.
    fn size(&self) -> Result<usize>;

    /// Item at `index`.
    fn get_item(&self, index: usize) -> Result<Item>;

    /// Invoke `f` on each item of `[begin, end)` in order, stopping
    /// early when it returns `false`.
    fn iterate<F>(&self, begin: usize, end: usize, f: F) -> Result<()>
    where
        F: FnMut(&Item) -> bool;

    /// Smallest index `j` in `[begin, end]` such that the item at `j`
    /// is `>= bound`, or `end` when no such item exists.
    fn find_lower_bound(&self, begin: usize, end: usize, bound: &Item) -> Result<usize>;

    /// Digest of the ids in `[begin, end)` mixed with the range size.
    fn fingerprint(&self, begin: usize, end: usize) -> Result<Fingerprint> {
        let mut acc = Accumulator::new();
        self.iterate(begin, end, |item| {
            acc.add(&item.id);
            true
        })?;
        Ok(acc.fingerprint(end - begin))
    }
}
