//! Combines the tempos committed by individual subbands into a single value.

use crate::config::SUBBAND_COUNT;

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    bpm: u32,
    votes: u32,
    sum: u32,
}

/// Returns the consensus tempo of a set of committed subband tempos, where 0
/// means not committed.
///
/// Every distinct committed value `v` collects a vote from each subband whose tempo is
/// `v - 1`, `v` or `v + 1`, so a subband may vote for several values. The value with the
/// most votes wins, the first one found on ties, and the result is the rounded mean of
/// the tempos that voted for it. Returns 0 if no subband has committed.
///
/// # Panics
/// If more than [`SUBBAND_COUNT`] tempos are given.
pub fn consensus_bpm(bpms: &[u32]) -> u32 {
    if bpms.len() > SUBBAND_COUNT {
        panic!(
            "Got {} subband tempos, expected at most {}",
            bpms.len(),
            SUBBAND_COUNT
        )
    }
    // Distinct values in first seen order
    let mut tallies = [Tally::default(); SUBBAND_COUNT];
    let mut distinct_count = 0;
    for bpm in bpms.iter().copied().filter(|bpm| *bpm != 0) {
        if !tallies[..distinct_count].iter().any(|tally| tally.bpm == bpm) {
            tallies[distinct_count].bpm = bpm;
            distinct_count += 1;
        }
    }

    let mut best: Option<Tally> = None;
    for tally in tallies[..distinct_count].iter_mut() {
        for bpm in bpms.iter().copied() {
            if bpm != 0 && bpm + 1 >= tally.bpm && bpm <= tally.bpm + 1 {
                tally.votes += 1;
                tally.sum += bpm;
            }
        }
        let is_better = match best {
            Some(best) => tally.votes > best.votes,
            None => tally.votes > 0,
        };
        if is_better {
            best = Some(*tally);
        }
    }

    match best {
        // Round to nearest
        Some(best) => (best.sum + best.votes / 2) / best.votes,
        None => 0,
    }
}
