//! Majority State Chooser
//!
//! Pure resolution of the cluster's agreed snapshot history from
//! height-keyed proposals. Given the node's own created snapshots and the
//! proposals collected from peers, [`choose_majority_state`] decides, per
//! height, which hash the cluster agrees on.
//!
//! ## Resolution Rules
//!
//! With `peers_size = |peer proposals| + 1` (self counts as a proposer):
//!
//! 1. Collect every hash proposed at a height, with its multiplicity `n`
//!    and the total number of proposals `of` at that height.
//! 2. Order candidates by hash ascending (deterministic tie-break).
//! 3. A candidate with `n / peers_size >= 0.5` wins outright.
//! 4. Otherwise, if every proposer weighed in at that height
//!    (`of == peers_size`), the candidate with the highest percentage wins;
//!    the prior ordering makes equal percentages resolve to the smallest
//!    hash.
//! 5. Otherwise the height stays unresolved and is omitted.
//!
//! The denominator in rule 3 is always `peers_size`, never `of`: a height
//! only a few peers reported cannot reach a clear majority even if those
//! peers are unanimous.
//!
//! ## Determinism
//!
//! The result depends only on the multiset of proposals, never on map
//! iteration order. Same inputs always produce the same output.

use std::collections::{BTreeMap, HashMap};

use crate::types::{Occurrences, PeerId, SnapshotsAtHeight};

/// Resolve the cluster-agreed `{height → hash}` mapping.
///
/// `created_snapshots` is this node's own proposal; `peers_proposals` maps
/// each peer to its height-keyed view. Heights where no candidate wins are
/// absent from the result.
pub fn choose_majority_state(
    created_snapshots: &SnapshotsAtHeight,
    peers_proposals: &HashMap<PeerId, SnapshotsAtHeight>,
) -> SnapshotsAtHeight {
    let peers_size = peers_proposals.len() + 1;

    // height → (hash → multiplicity), BTreeMaps for deterministic order.
    let mut proposals_by_height: BTreeMap<i64, BTreeMap<String, usize>> = BTreeMap::new();
    tally(&mut proposals_by_height, created_snapshots);
    for proposal in peers_proposals.values() {
        tally(&mut proposals_by_height, proposal);
    }

    let mut chosen = SnapshotsAtHeight::new();
    for (height, counts) in proposals_by_height {
        let of: usize = counts.values().sum();
        let occurrences: Vec<Occurrences<String>> = counts
            .into_iter()
            .map(|(value, n)| Occurrences { value, n, of })
            .collect();

        if let Some(winner) = select_at_height(&occurrences, peers_size) {
            chosen.insert(height, winner);
        }
    }
    chosen
}

fn tally(by_height: &mut BTreeMap<i64, BTreeMap<String, usize>>, proposal: &SnapshotsAtHeight) {
    for (height, hash) in proposal {
        *by_height
            .entry(*height)
            .or_default()
            .entry(hash.clone())
            .or_insert(0) += 1;
    }
}

/// Pick the winning hash at one height, if any.
///
/// `occurrences` must already be ordered by value ascending (as produced
/// by [`choose_majority_state`]).
fn select_at_height(occurrences: &[Occurrences<String>], peers_size: usize) -> Option<String> {
    // Clear majority: at least half of all proposers named this hash.
    if let Some(clear) = occurrences
        .iter()
        .find(|occ| occ.n as f64 / peers_size as f64 >= 0.5)
    {
        return Some(clear.value.clone());
    }

    // Every proposer weighed in at this height: the most popular hash
    // wins; strict comparison keeps the first (smallest) on ties.
    let of = occurrences.first().map(|occ| occ.of)?;
    if of == peers_size {
        let mut best: Option<&Occurrences<String>> = None;
        for occ in occurrences {
            if best.map_or(true, |b| occ.n > b.n) {
                best = Some(occ);
            }
        }
        return best.map(|occ| occ.value.clone());
    }

    None
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
