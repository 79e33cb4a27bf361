//! Proptest generators for property-based testing.

use proptest::prelude::*;

use rangesync_core::{Id, Item};
use rangesync_store::VectorStorage;

use crate::fixtures::sealed_storage_from;

/// Generate a random id.
pub fn id() -> impl Strategy<Value = Id> {
    any::<[u8; 32]>().prop_map(Id::from_bytes)
}

/// Generate a timestamp well below the infinity sentinel.
pub fn timestamp() -> impl Strategy<Value = u64> {
    0u64..(1 << 40)
}

/// Generate a random item.
pub fn item() -> impl Strategy<Value = Item> {
    (timestamp(), id()).prop_map(|(timestamp, id)| Item::new(timestamp, id))
}

/// Generate up to `max` distinct items.
pub fn item_set(max: usize) -> impl Strategy<Value = Vec<Item>> {
    prop::collection::btree_set(item(), 0..max).prop_map(|set| set.into_iter().collect())
}

/// Generate a sealed storage of up to `max` items.
pub fn sealed_storage(max: usize) -> impl Strategy<Value = VectorStorage> {
    item_set(max).prop_map(|items| sealed_storage_from(&items))
}

/// Generate two item sets drawn from one universe, so genuine overlap
/// between the sides occurs: each item lands on one side, the other,
/// or both.
pub fn overlapping_sets(max: usize) -> impl Strategy<Value = (Vec<Item>, Vec<Item>)> {
    item_set(max).prop_flat_map(|universe| {
        let len = universe.len();
        prop::collection::vec(0u8..3, len).prop_map(move |sides| {
            let mut ours = Vec::new();
            let mut theirs = Vec::new();
            for (item, side) in universe.iter().zip(sides.iter().copied()) {
                match side {
                    0 => ours.push(*item),
                    1 => theirs.push(*item),
                    _ => {
                        ours.push(*item);
                        theirs.push(*item);
                    }
                }
            }
            (ours, theirs)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::reconcile_to_completion;
    use rangesync_core::{decode_var_int, encode_var_int};
    use rangesync_store::Storage;

    /// Ids of the items present in `a` but not in `b`, sorted and
    /// deduplicated.
    fn difference_ids(a: &[Item], b: &[Item]) -> Vec<Id> {
        let mut ids: Vec<Id> = a
            .iter()
            .filter(|item| !b.contains(item))
            .map(|item| item.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    proptest! {
        #[test]
        fn varint_roundtrip(value in any::<u64>()) {
            let mut buf = Vec::new();
            encode_var_int(&mut buf, value);

            let mut input = buf.as_slice();
            prop_assert_eq!(decode_var_int(&mut input), Ok(value));
            prop_assert!(input.is_empty());
        }

        #[test]
        fn fingerprint_ignores_insertion_order(items in item_set(40)) {
            let forward = sealed_storage_from(&items);

            let reversed: Vec<Item> = items.iter().rev().copied().collect();
            let backward = sealed_storage_from(&reversed);

            let size = items.len();
            prop_assert_eq!(
                forward.fingerprint(0, size).unwrap(),
                backward.fingerprint(0, size).unwrap()
            );
        }

        #[test]
        fn reconciliation_reports_exact_symmetric_difference(
            (ours_items, theirs_items) in overlapping_sets(48)
        ) {
            let ours = sealed_storage_from(&ours_items);
            let theirs = sealed_storage_from(&theirs_items);

            let outcome = reconcile_to_completion(&ours, &theirs, 0).unwrap();

            prop_assert_eq!(
                outcome.have_ids,
                difference_ids(&ours_items, &theirs_items)
            );
            prop_assert_eq!(
                outcome.need_ids,
                difference_ids(&theirs_items, &ours_items)
            );
        }

        #[test]
        fn reconciliation_respects_frame_limit(
            (ours_items, theirs_items) in overlapping_sets(48)
        ) {
            let ours = sealed_storage_from(&ours_items);
            let theirs = sealed_storage_from(&theirs_items);

            let outcome = reconcile_to_completion(&ours, &theirs, 4096).unwrap();
            for size in outcome.message_sizes {
                prop_assert!(size <= 4096);
            }
        }
    }
}
