//! Greedy no-rematch pairing.
//!
//! This is deliberately a single-pass heuristic, not a maximum-matching
//! solver. It never backtracks, so it can leave players unmatched even
//! when a complete pairing exists elsewhere in the search space. Tournament
//! end detection relies on exactly this behavior, so an "improved" matcher
//! would be a different algorithm, not a fix.

use std::collections::HashSet;

use super::entities::ChessId;

/// Normalized unordered key for a pair of players.
///
/// History and rematch checks always go through this key, so `(a, b)` and
/// `(b, a)` name the same pairing.
#[must_use]
pub fn pair_key(a: ChessId, b: ChessId) -> (ChessId, ChessId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Pair players in roster order, skipping pairings already in `history`.
///
/// For each player not yet paired this round, the remainder of `order` is
/// scanned for the first candidate that is also unpaired and has never met
/// the player before. Players with no such candidate are reported in the
/// second return value; sitting out is not an error.
#[must_use]
pub fn generate_pairs(
    order: &[ChessId],
    history: &HashSet<(ChessId, ChessId)>,
) -> (Vec<(ChessId, ChessId)>, Vec<ChessId>) {
    let mut pairs = Vec::with_capacity(order.len() / 2);
    let mut unmatched = Vec::new();
    let mut paired: HashSet<ChessId> = HashSet::with_capacity(order.len());

    for (i, &player) in order.iter().enumerate() {
        if paired.contains(&player) {
            continue;
        }
        let candidate = order[i + 1..]
            .iter()
            .copied()
            .find(|&other| !paired.contains(&other) && !history.contains(&pair_key(player, other)));
        match candidate {
            Some(other) => {
                paired.insert(player);
                paired.insert(other);
                pairs.push((player, other));
            }
            None => unmatched.push(player),
        }
    }

    (pairs, unmatched)
}
