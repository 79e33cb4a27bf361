//! # Rangesync Engine
//!
//! Range-based set reconciliation: two parties holding sets of
//! `(timestamp, id)` records discover each other's missing records by
//! exchanging messages whose total size stays sub-linear in the set
//! size when the sets are similar.
//!
//! ## Overview
//!
//! The party that calls [`Reconciler::initiate`] is the *initiator*;
//! it sends the opening query and, over the course of the
//! conversation, collects the `have`/`need` id sets. The *responder*
//! feeds every incoming message to [`Reconciler::reconcile`] and sends
//! back the reply. Transporting the opaque message bytes between the
//! two parties is the caller's job.
//!
//! ## Key Properties
//!
//! - **Half-duplex**: one message in flight per direction, no internal
//!   scheduler; every call runs to completion.
//! - **Resumable ranges**: a caller-imposed frame-size limit makes the
//!   engine close each message with a fingerprint of the uncovered
//!   tail, so the conversation picks up exactly where it stopped.
//! - **Shared storage**: sealed storage is immutable; run any number
//!   of concurrent conversations over one storage with one engine
//!   each.
//!
//! ## Usage
//!
//! ```rust
//! use rangesync_core::Id;
//! use rangesync_engine::Reconciler;
//! use rangesync_store::VectorStorage;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut ours = VectorStorage::new();
//! ours.insert(1, Id::from_bytes([0x11; 32]))?;
//! ours.seal()?;
//!
//! let mut theirs = VectorStorage::new();
//! theirs.insert(1, Id::from_bytes([0x11; 32]))?;
//! theirs.insert(2, Id::from_bytes([0x22; 32]))?;
//! theirs.seal()?;
//!
//! let mut client = Reconciler::new(&ours, 0)?;
//! let mut server = Reconciler::new(&theirs, 0)?;
//!
//! let mut message = client.initiate()?;
//! let mut need_ids = Vec::new();
//! loop {
//!     let response = server.reconcile(&message)?;
//!     let step = client.reconcile(&response.reply)?;
//!     need_ids.extend(step.need_ids.iter().copied());
//!     if step.is_complete() {
//!         break;
//!     }
//!     message = step.reply;
//! }
//!
//! assert_eq!(need_ids, vec![Id::from_bytes([0x22; 32])]);
//! # Ok(()) }
//! ```

pub mod engine;
pub mod error;
pub mod wire;

pub use engine::{ReconcileReport, Reconciler};
pub use error::{EngineError, Result};
pub use wire::{limits, Mode, PROTOCOL_VERSION, VERSION_WINDOW};
