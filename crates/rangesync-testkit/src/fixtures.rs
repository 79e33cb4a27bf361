//! Test fixtures and the two-engine conversation driver.

use rangesync_core::{Id, Item};
use rangesync_engine::{EngineError, Reconciler};
use rangesync_store::VectorStorage;

/// Upper bound on conversation length; a broken protocol trips this
/// instead of hanging the test suite.
pub const MAX_ROUNDS: usize = 400;

/// Aggregate result of a completed conversation.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Number of responder/initiator message exchanges.
    pub rounds: usize,
    /// Deduplicated, sorted ids the initiator holds and the responder
    /// lacks.
    pub have_ids: Vec<Id>,
    /// Deduplicated, sorted ids the responder holds and the initiator
    /// lacks.
    pub need_ids: Vec<Id>,
    /// Every message size observed, in transmission order.
    pub message_sizes: Vec<usize>,
}

/// Build a sealed storage from a slice of items (any order, no
/// duplicates).
pub fn sealed_storage_from(items: &[Item]) -> VectorStorage {
    let mut storage = VectorStorage::with_capacity(items.len());
    for item in items {
        storage.insert_item(*item).expect("storage is open");
    }
    storage.seal().expect("items are unique");
    storage
}

/// Generate `count` random ids.
pub fn random_ids(count: usize) -> Vec<Id> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..count).map(|_| Id::from_bytes(rng.gen())).collect()
}

/// Drive a conversation between an initiator over `ours` and a
/// responder over `theirs` until the initiator reports completion.
///
/// Ids may be reported more than once when a frame limit forces a
/// range to be re-covered; the outcome carries the deduplicated union.
pub fn reconcile_to_completion(
    ours: &VectorStorage,
    theirs: &VectorStorage,
    frame_size_limit: usize,
) -> Result<SyncOutcome, EngineError> {
    let mut client = Reconciler::new(ours, frame_size_limit)?;
    let mut server = Reconciler::new(theirs, frame_size_limit)?;

    let mut have_ids = Vec::new();
    let mut need_ids = Vec::new();
    let mut message_sizes = Vec::new();
    let mut rounds = 0;

    let mut message = client.initiate()?;
    message_sizes.push(message.len());

    loop {
        rounds += 1;
        assert!(
            rounds <= MAX_ROUNDS,
            "reconciliation exceeded {MAX_ROUNDS} rounds"
        );

        let response = server.reconcile(&message)?;
        message_sizes.push(response.reply.len());

        let step = client.reconcile(&response.reply)?;
        let complete = step.is_complete();
        have_ids.extend(step.have_ids);
        need_ids.extend(step.need_ids);
        if complete {
            break;
        }
        message_sizes.push(step.reply.len());
        message = step.reply;
    }

    have_ids.sort_unstable();
    have_ids.dedup();
    need_ids.sort_unstable();
    need_ids.dedup();

    Ok(SyncOutcome {
        rounds,
        have_ids,
        need_ids,
        message_sizes,
    })
}
