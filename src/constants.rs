//! Engine-wide defaults and domain constants.

use crate::tournament::entities::Points;

/// Number of rounds a tournament targets unless configured otherwise.
pub const DEFAULT_ROUND_COUNT: u32 = 4;

/// Directory tournament snapshots are written to by default.
pub const DEFAULT_TOURNAMENTS_DIR: &str = "data/tournaments";

/// Environment variable overriding the tournaments directory.
pub const TOURNAMENTS_DIR_ENV: &str = "CHESS_TOURNAMENTS_DIR";

/// The only legal (score1, score2) combinations for a finished match:
/// win, loss, or draw.
pub const LEGAL_OUTCOMES: [(Points, Points); 3] = [(1.0, 0.0), (0.0, 1.0), (0.5, 0.5)];
