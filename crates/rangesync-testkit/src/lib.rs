//! # Rangesync Testkit
//!
//! Testing utilities for the rangesync crates.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Generators**: Proptest strategies for ids, items, and pairs of
//!   overlapping item sets
//! - **Fixtures**: Helpers for building sealed storage and driving a
//!   full two-engine conversation to completion
//!
//! ## Usage
//!
//! ```rust
//! use rangesync_core::{Id, Item};
//! use rangesync_testkit::fixtures::{reconcile_to_completion, sealed_storage_from};
//!
//! let ours = sealed_storage_from(&[Item::new(1, Id::from_bytes([0xaa; 32]))]);
//! let theirs = sealed_storage_from(&[]);
//!
//! let outcome = reconcile_to_completion(&ours, &theirs, 0).unwrap();
//! assert_eq!(outcome.have_ids, vec![Id::from_bytes([0xaa; 32])]);
//! assert!(outcome.need_ids.is_empty());
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{random_ids, reconcile_to_completion, sealed_storage_from, SyncOutcome};
pub use generators::{id, item, item_set, overlapping_sets, sealed_storage, timestamp};
