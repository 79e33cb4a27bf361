//! Reconciliation state machine.
//!
//! A half-duplex conversation: the initiator sends a query covering the
//! whole key space, both sides then alternate `reconcile` calls. Each
//! step narrows disagreeing ranges — a mismatched fingerprint splits
//! into sixteen bucket fingerprints, small ranges dissolve into id
//! lists — until the initiator has nothing left to send.

use std::collections::HashSet;

use rangesync_core::{
    codec, decode_var_int, encode_var_int, take_bytes, Bound, Id, FINGERPRINT_SIZE, ID_SIZE,
};
use rangesync_store::Storage;

use crate::error::{EngineError, Result};
use crate::wire::{limits, Mode, BUCKETS, PROTOCOL_VERSION, VERSION_WINDOW};

/// Result of one reconciliation step.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// The next message for the peer. Empty on the initiator side means
    /// the conversation is complete.
    pub reply: Vec<u8>,
    /// Ids present locally that the peer lacks. Initiator only.
    pub have_ids: Vec<Id>,
    /// Ids present on the peer but missing locally. Initiator only.
    pub need_ids: Vec<Id>,
}

impl ReconcileReport {
    /// True once the initiator has nothing further to send.
    pub fn is_complete(&self) -> bool {
        self.reply.is_empty()
    }
}

/// Half-duplex reconciliation engine bound to a sealed storage.
///
/// An engine holds per-conversation codec state, so each conversation
/// needs its own instance; any number of engines may share one sealed
/// storage by reference. The party that calls [`initiate`] becomes the
/// initiator and receives the discovered have/need ids; the other side
/// only ever calls [`reconcile`].
///
/// Any error surfaced by `initiate` or `reconcile` abandons the
/// conversation: the engine is poisoned and every later call fails.
///
/// [`initiate`]: Reconciler::initiate
/// [`reconcile`]: Reconciler::reconcile
pub struct Reconciler<'a, S: Storage> {
    storage: &'a S,
    frame_size_limit: usize,
    is_initiator: bool,
    poisoned: bool,
    last_timestamp_in: u64,
    last_timestamp_out: u64,
}

impl<'a, S: Storage> Reconciler<'a, S> {
    /// Bind an engine to a sealed storage.
    ///
    /// `frame_size_limit` soft-caps outbound messages in bytes. Zero
    /// disables the cap; any other value below
    /// [`limits::MIN_FRAME_SIZE_LIMIT`] is rejected.
    pub fn new(storage: &'a S, frame_size_limit: usize) -> Result<Self> {
        if frame_size_limit != 0 && frame_size_limit < limits::MIN_FRAME_SIZE_LIMIT {
            return Err(EngineError::FrameSizeLimitTooSmall(frame_size_limit));
        }

        Ok(Self {
            storage,
            frame_size_limit,
            is_initiator: false,
            poisoned: false,
            last_timestamp_in: 0,
            last_timestamp_out: 0,
        })
    }

    /// Produce the opening query: one range covering the whole key
    /// space, immediately split.
    pub fn initiate(&mut self) -> Result<Vec<u8>> {
        if self.poisoned {
            return Err(EngineError::Poisoned);
        }
        if self.is_initiator {
            return Err(EngineError::AlreadyInitiated);
        }
        self.is_initiator = true;

        match self.initiate_inner() {
            Ok(output) => Ok(output),
            Err(err) => {
                self.poisoned = true;
                Err(err)
            }
        }
    }

    fn initiate_inner(&mut self) -> Result<Vec<u8>> {
        self.last_timestamp_out = 0;

        let mut output = Vec::with_capacity(128);
        output.push(PROTOCOL_VERSION);
        self.split_range(0, self.storage.size()?, &Bound::INFINITY, &mut output)?;

        Ok(output)
    }

    /// Consume a peer message, producing the next message plus any
    /// newly discovered have/need ids.
    pub fn reconcile(&mut self, query: &[u8]) -> Result<ReconcileReport> {
        if self.poisoned {
            return Err(EngineError::Poisoned);
        }

        match self.reconcile_inner(query) {
            Ok(report) => Ok(report),
            Err(err) => {
                self.poisoned = true;
                Err(err)
            }
        }
    }

    fn reconcile_inner(&mut self, query: &[u8]) -> Result<ReconcileReport> {
        let storage = self.storage;
        let mut input = query;
        let mut report = ReconcileReport::default();

        // Fresh delta state per message, in both directions.
        self.last_timestamp_in = 0;
        self.last_timestamp_out = 0;

        let mut output = Vec::with_capacity(128);
        output.push(PROTOCOL_VERSION);

        let version = take_bytes(&mut input, 1)?[0];
        if !VERSION_WINDOW.contains(&version) {
            return Err(EngineError::InvalidVersion(version));
        }
        if version != PROTOCOL_VERSION {
            if self.is_initiator {
                return Err(EngineError::UnsupportedVersion(version));
            }
            // Downgrade signal: answer with nothing but our version.
            tracing::warn!(peer_version = version, "peer version mismatch, signalling ours");
            report.reply = output;
            return Ok(report);
        }

        let storage_size = storage.size()?;
        let mut prev_bound = Bound::ZERO;
        let mut prev_index = 0usize;
        let mut skip = false;
        let mut ranges = 0usize;

        while !input.is_empty() {
            let mut o: Vec<u8> = Vec::new();
            ranges += 1;

            let curr_bound = codec::decode_bound(&mut input, &mut self.last_timestamp_in)?;
            if curr_bound.item < prev_bound.item {
                return Err(EngineError::InvalidMessage(format!(
                    "bound decreases at record {ranges}"
                )));
            }
            let mode = Mode::try_from(decode_var_int(&mut input)?)?;

            let lower = prev_index;
            let mut upper = storage.find_lower_bound(prev_index, storage_size, &curr_bound.item)?;

            match mode {
                Mode::Skip => skip = true,

                Mode::Fingerprint => {
                    let theirs = take_bytes(&mut input, FINGERPRINT_SIZE)?;
                    let ours = storage.fingerprint(lower, upper)?;

                    if ours.as_bytes() == theirs {
                        skip = true;
                    } else {
                        self.flush_skip(&mut skip, &prev_bound, &mut o);
                        self.split_range(lower, upper, &curr_bound, &mut o)?;
                    }
                }

                Mode::IdList => {
                    let num_ids = decode_var_int(&mut input)? as usize;
                    let mut their_ids = Vec::with_capacity(num_ids.min(1024));
                    for _ in 0..num_ids {
                        let raw = take_bytes(&mut input, ID_SIZE)?;
                        let mut bytes = [0u8; ID_SIZE];
                        bytes.copy_from_slice(raw);
                        their_ids.push(Id::from_bytes(bytes));
                    }

                    if self.is_initiator {
                        let mut unmatched: HashSet<Id> = their_ids.iter().copied().collect();
                        storage.iterate(lower, upper, |item| {
                            if !unmatched.remove(&item.id) {
                                report.have_ids.push(item.id);
                            }
                            true
                        })?;
                        report.need_ids.extend(
                            their_ids.iter().copied().filter(|id| unmatched.contains(id)),
                        );
                        skip = true;
                    } else {
                        self.flush_skip(&mut skip, &prev_bound, &mut o);

                        let mut response_ids: Vec<u8> = Vec::new();
                        let mut num_response_ids = 0usize;
                        let mut end_bound = curr_bound;

                        let frame_size_limit = self.frame_size_limit;
                        let reserved = output.len() + o.len();
                        storage.iterate(lower, upper, |item| {
                            let next_len = reserved + response_ids.len() + ID_SIZE;
                            if exceeds_frame_limit(frame_size_limit, next_len) {
                                // No room for this id: it becomes the
                                // record's bound and the tail fingerprint
                                // below re-covers the remainder.
                                end_bound = Bound::from_item(*item);
                                upper = prev_index;
                                return false;
                            }
                            response_ids.extend_from_slice(item.id.as_bytes());
                            num_response_ids += 1;
                            true
                        })?;

                        codec::encode_bound(&mut o, &end_bound, &mut self.last_timestamp_out);
                        encode_var_int(&mut o, Mode::IdList as u64);
                        encode_var_int(&mut o, num_response_ids as u64);
                        o.extend_from_slice(&response_ids);

                        // Flush now so a frame-limit stop right below
                        // keeps the partial id list.
                        output.extend_from_slice(&o);
                        o.clear();
                    }
                }
            }

            if exceeds_frame_limit(self.frame_size_limit, output.len() + o.len()) {
                // Frame full: one fingerprint summarises everything not
                // yet covered, and the peer re-requests only that tail.
                let tail = storage.fingerprint(upper, storage_size)?;
                codec::encode_bound(&mut output, &Bound::INFINITY, &mut self.last_timestamp_out);
                encode_var_int(&mut output, Mode::Fingerprint as u64);
                output.extend_from_slice(tail.as_bytes());
                break;
            }
            output.extend_from_slice(&o);

            prev_index = upper;
            prev_bound = curr_bound;
        }

        if self.is_initiator && output.len() == 1 {
            // Nothing but the version byte: the conversation is done.
            output.clear();
        }

        tracing::debug!(
            ranges,
            reply_len = output.len(),
            have = report.have_ids.len(),
            need = report.need_ids.len(),
            "reconcile step"
        );

        report.reply = output;
        Ok(report)
    }

    /// Emit a coalesced skip record for the pending skipped ranges.
    fn flush_skip(&mut self, skip: &mut bool, prev_bound: &Bound, o: &mut Vec<u8>) {
        if *skip {
            *skip = false;
            codec::encode_bound(o, prev_bound, &mut self.last_timestamp_out);
            encode_var_int(o, Mode::Skip as u64);
        }
    }

    /// Re-describe a disagreeing range: small ranges become an id list,
    /// larger ones split into [`BUCKETS`] fingerprinted sub-ranges with
    /// minimal separator bounds.
    fn split_range(
        &mut self,
        lower: usize,
        upper: usize,
        upper_bound: &Bound,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let storage = self.storage;
        let num_elems = upper - lower;

        if num_elems < BUCKETS * 2 {
            codec::encode_bound(out, upper_bound, &mut self.last_timestamp_out);
            encode_var_int(out, Mode::IdList as u64);
            encode_var_int(out, num_elems as u64);
            storage.iterate(lower, upper, |item| {
                out.extend_from_slice(item.id.as_bytes());
                true
            })?;
            return Ok(());
        }

        let items_per_bucket = num_elems / BUCKETS;
        let buckets_with_extra = num_elems % BUCKETS;
        let mut curr = lower;

        for bucket in 0..BUCKETS {
            let bucket_size = items_per_bucket + usize::from(bucket < buckets_with_extra);
            let fingerprint = storage.fingerprint(curr, curr + bucket_size)?;
            curr += bucket_size;

            let next_bound = if curr == upper {
                *upper_bound
            } else {
                Bound::minimal(&storage.get_item(curr - 1)?, &storage.get_item(curr)?)
            };

            codec::encode_bound(out, &next_bound, &mut self.last_timestamp_out);
            encode_var_int(out, Mode::Fingerprint as u64);
            out.extend_from_slice(fingerprint.as_bytes());
        }

        Ok(())
    }
}

fn exceeds_frame_limit(frame_size_limit: usize, size: usize) -> bool {
    frame_size_limit != 0 && size > frame_size_limit - limits::FRAME_SIZE_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangesync_store::VectorStorage;

    fn sealed(entries: &[(u64, u8)]) -> VectorStorage {
        let mut storage = VectorStorage::new();
        for &(timestamp, byte) in entries {
            storage.insert(timestamp, Id::from_bytes([byte; ID_SIZE])).unwrap();
        }
        storage.seal().unwrap();
        storage
    }

    #[test]
    fn frame_size_limit_is_validated() {
        let storage = sealed(&[]);

        assert!(Reconciler::new(&storage, 0).is_ok());
        assert!(Reconciler::new(&storage, 4096).is_ok());
        assert!(Reconciler::new(&storage, 50_000).is_ok());
        assert!(matches!(
            Reconciler::new(&storage, 4095),
            Err(EngineError::FrameSizeLimitTooSmall(4095))
        ));
        assert!(matches!(
            Reconciler::new(&storage, 1),
            Err(EngineError::FrameSizeLimitTooSmall(1))
        ));
    }

    #[test]
    fn initiate_twice_fails() {
        let storage = sealed(&[(1, 0x01)]);
        let mut engine = Reconciler::new(&storage, 0).unwrap();

        engine.initiate().unwrap();
        assert!(matches!(
            engine.initiate(),
            Err(EngineError::AlreadyInitiated)
        ));
    }

    #[test]
    fn initial_message_for_empty_storage() {
        let storage = sealed(&[]);
        let mut engine = Reconciler::new(&storage, 0).unwrap();

        // Version byte, then one empty id list bounded at infinity:
        // ts sentinel (varint 0), id len 0, mode 2, count 0.
        assert_eq!(engine.initiate().unwrap(), vec![0x61, 0x00, 0x00, 0x02, 0x00]);
    }

    #[test]
    fn small_initial_message_lists_all_ids() {
        let storage = sealed(&[(0, 0x0a), (5, 0x0b)]);
        let mut engine = Reconciler::new(&storage, 0).unwrap();

        let message = engine.initiate().unwrap();
        assert_eq!(message[0], PROTOCOL_VERSION);
        // bound inf (2 bytes) + mode + count + two full ids.
        assert_eq!(message.len(), 1 + 2 + 1 + 1 + 2 * ID_SIZE);
        assert_eq!(&message[5..5 + ID_SIZE], &[0x0a; ID_SIZE]);
    }

    #[test]
    fn initiator_round_trip_on_equal_sets() {
        let entries = [(0, 0x00), (1, 0x01), (3, 0x03)];
        let ours = sealed(&entries);
        let theirs = sealed(&entries);

        let mut client = Reconciler::new(&ours, 0).unwrap();
        let mut server = Reconciler::new(&theirs, 0).unwrap();

        let query = client.initiate().unwrap();
        let response = server.reconcile(&query).unwrap();
        let step = client.reconcile(&response.reply).unwrap();

        assert!(step.is_complete());
        assert!(step.have_ids.is_empty());
        assert!(step.need_ids.is_empty());
    }

    #[test]
    fn poisoned_engine_refuses_further_calls() {
        let storage = sealed(&[(1, 0x01)]);
        let mut engine = Reconciler::new(&storage, 0).unwrap();

        assert!(matches!(
            engine.reconcile(&[0x42]),
            Err(EngineError::InvalidVersion(0x42))
        ));
        assert!(matches!(
            engine.reconcile(&[PROTOCOL_VERSION]),
            Err(EngineError::Poisoned)
        ));
        assert!(matches!(engine.initiate(), Err(EngineError::Poisoned)));
    }
}
