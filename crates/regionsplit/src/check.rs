//! Consistency checks over scanned region lists.
//!
//! The placement service answers a region scan from whatever it knows at that
//! instant, so a single answer may be empty, start too late, stop too early or
//! contain a hole left by an in-flight split. These checks decide whether a
//! list can be used as is.
//!
//! Invariants are evaluated in a fixed order and the first violation wins:
//!
//! 1. the list is non-empty
//! 2. the first region starts at or before the requested start key
//! 3. (full check only) the last region is unbounded or ends at or after the
//!    requested end key
//! 4. each region ends exactly where the next one starts

use crate::error::{Error, Inconsistency, Result};
use crate::region::{KeyRange, RegionInfo};

/// Check that `regions` is a gapless list covering the whole of `range`.
pub fn check_region_consistency(range: &KeyRange, regions: &[RegionInfo]) -> Result<()> {
    check(range, regions, true)
}

/// Check that `regions` is a gapless list starting at or before
/// `range.start`, without requiring it to reach `range.end`.
///
/// Suited to callers that consume a well-formed prefix batch by batch.
pub fn check_part_region_consistency(range: &KeyRange, regions: &[RegionInfo]) -> Result<()> {
    check(range, regions, false)
}

fn check(range: &KeyRange, regions: &[RegionInfo], require_end: bool) -> Result<()> {
    violation(range, regions, require_end).map_or(Ok(()), |violation| {
        Err(Error::RegionScanInconsistency {
            range: range.clone(),
            violation,
        })
    })
}

fn violation(range: &KeyRange, regions: &[RegionInfo], require_end: bool) -> Option<Inconsistency> {
    let (first, last) = match (regions.first(), regions.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Some(Inconsistency::EmptyResult),
    };

    if first.start_key > range.start {
        return Some(Inconsistency::StartKeyOverrun {
            region_id: first.id,
            region_start: first.start_key.clone(),
            epoch: first.epoch,
        });
    }

    // An empty requested end compares below every key, so any last region
    // covers an unbounded request.
    if require_end && !last.end_key.is_empty() && last.end_key < range.end {
        return Some(Inconsistency::EndKeyUnderrun {
            region_id: last.id,
            region_end: last.end_key.clone(),
            epoch: last.epoch,
        });
    }

    regions.windows(2).find_map(|pair| {
        let (left, right) = (&pair[0], &pair[1]);
        (left.end_key != right.start_key).then(|| Inconsistency::Gap {
            left_id: left.id,
            right_id: right.id,
            left_end: left.end_key.clone(),
            right_start: right.start_key.clone(),
            left_epoch: left.epoch,
            right_epoch: right.epoch,
        })
    })
}
