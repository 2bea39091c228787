//! Cumulative-sum sampling shared by room-type, layout and enemy draws.

use crate::rng::GenRng;

/// Picks an index proportional to `weights`. The draw is uniform in
/// `[0, total)` and the first index whose running sum reaches it wins, so an
/// exact boundary resolves to the earlier entry. Non-positive weights are
/// never chosen. Returns `None` when no weight is positive.
pub(crate) fn cumulative_pick(weights: &[f32], rng: &mut GenRng) -> Option<usize> {
    let total: f32 = weights.iter().filter(|weight| **weight > 0.0).sum();
    if total <= 0.0 {
        return None;
    }
    let roll = rng.below_f32(total);
    scan(weights, roll)
}

fn scan(weights: &[f32], roll: f32) -> Option<usize> {
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (index, weight) in weights.iter().enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last_positive = Some(index);
        if cumulative >= roll {
            return Some(index);
        }
    }
    last_positive
}
