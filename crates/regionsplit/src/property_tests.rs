//! Property-based tests for regionsplit
//!
//! Generates random region layouts and checks the consistency invariants hold
//! for every one of them, not just the hand-picked cases in `check`.

#[cfg(test)]
mod tests {
    use crate::check::{check_part_region_consistency, check_region_consistency};
    use crate::error::{Error, Inconsistency};
    use crate::region::{KeyRange, RegionInfo};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    // ===== Strategy Generators =====

    /// Sorted, distinct, non-empty split keys.
    fn arb_split_keys() -> impl Strategy<Value = Vec<Vec<u8>>> {
        prop::collection::btree_set(prop::collection::vec(any::<u8>(), 1..4), 1..12)
            .prop_map(|keys: BTreeSet<Vec<u8>>| keys.into_iter().collect())
    }

    /// Regions tiling the whole key space at the given split keys.
    fn tile(splits: &[Vec<u8>]) -> Vec<RegionInfo> {
        let mut bounds = Vec::with_capacity(splits.len() + 2);
        bounds.push(Vec::new());
        bounds.extend(splits.iter().cloned());
        bounds.push(Vec::new());

        bounds
            .windows(2)
            .enumerate()
            .map(|(i, pair)| RegionInfo::new(i as u64 + 1, pair[0].clone(), pair[1].clone()))
            .collect()
    }

    // ===== Checker Properties =====

    proptest! {
        /// Property: a tiling of the whole key space covers any range
        /// Invariant: both checkers accept it
        #[test]
        fn prop_full_tiling_is_consistent(
            splits in arb_split_keys(),
            start in prop::collection::vec(any::<u8>(), 0..4),
            end in prop::collection::vec(any::<u8>(), 0..4),
        ) {
            let (start, end) = if !end.is_empty() && start > end { (end, start) } else { (start, end) };
            let range = KeyRange::new(start, end);
            let regions = tile(&splits);

            prop_assert!(check_region_consistency(&range, &regions).is_ok());
            prop_assert!(check_part_region_consistency(&range, &regions).is_ok());
        }

        /// Property: any contiguous prefix starting at the beginning is a
        /// valid partial result
        /// Invariant: the partial checker accepts it
        #[test]
        fn prop_prefix_passes_partial_check(
            splits in arb_split_keys(),
            take in 1usize..12,
        ) {
            let regions = tile(&splits);
            let take = take.min(regions.len());
            let range = KeyRange::new(Vec::new(), Vec::new());

            prop_assert!(check_part_region_consistency(&range, &regions[..take]).is_ok());
        }

        /// Property: dropping an interior region opens a gap
        /// Invariant: both checkers report the gap between its neighbours
        #[test]
        fn prop_missing_region_is_a_gap(
            splits in arb_split_keys(),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut regions = tile(&splits);
            prop_assume!(regions.len() >= 3);

            let removed = 1 + pick.index(regions.len() - 2);
            let left_id = regions[removed - 1].id;
            let right_id = regions[removed + 1].id;
            regions.remove(removed);

            let range = KeyRange::new(Vec::new(), Vec::new());
            for result in [
                check_region_consistency(&range, &regions),
                check_part_region_consistency(&range, &regions),
            ] {
                match result {
                    Err(Error::RegionScanInconsistency {
                        violation: Inconsistency::Gap { left_id: l, right_id: r, .. },
                        ..
                    }) => {
                        prop_assert_eq!(l, left_id);
                        prop_assert_eq!(r, right_id);
                    }
                    other => prop_assert!(false, "expected a gap, got {:?}", other),
                }
            }
        }
    }
}
