//! # Rangesync Store
//!
//! Storage abstraction for range-based set reconciliation. Provides a
//! trait-based read interface over a sealed, ordered item set, with a
//! sorted-vector implementation.
//!
//! ## Overview
//!
//! A storage starts *open*: items may be inserted in any order. Sealing
//! sorts the items, rejects duplicates, and freezes the set; from then
//! on it answers index queries, ordered iteration, binary searches, and
//! range fingerprints. Reconciliation engines only ever see sealed
//! storage, and any number of engines may share one by reference.
//!
//! ## Key Types
//!
//! - [`Storage`] - The read interface engines are generic over
//! - [`VectorStorage`] - The canonical sorted-vector implementation
//! - [`StoreError`] - Lifecycle and range errors
//!
//! ## Usage
//!
//! ```rust
//! use rangesync_core::Id;
//! use rangesync_store::{Storage, VectorStorage};
//!
//! # fn main() -> Result<(), rangesync_store::StoreError> {
//! let mut storage = VectorStorage::new();
//! storage.insert(10, Id::from_bytes([0xab; 32]))?;
//! storage.insert(7, Id::from_bytes([0x01; 32]))?;
//! storage.seal()?;
//!
//! assert_eq!(storage.size()?, 2);
//! assert_eq!(storage.get_item(0)?.timestamp, 7);
//! # Ok(()) }
//! ```

pub mod error;
pub mod traits;
pub mod vector;

pub use error::{Result, StoreError};
pub use traits::Storage;
pub use vector::VectorStorage;
