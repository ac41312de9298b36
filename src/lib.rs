//! # Chess Tournament
//!
//! A Swiss-style, elimination-free tournament engine for a fixed roster of
//! players. The engine forms round pairings under a no-rematch constraint,
//! accumulates scores as results come in, detects when the competition is
//! complete, and snapshots its entire state to JSON so a session can resume
//! after a restart.
//!
//! ## Architecture
//!
//! The engine is a single synchronous state machine around one in-memory
//! [`Tournament`] value:
//!
//! - **Entities**: players, matches, rounds, tournament
//! - **Pairing**: a deterministic greedy pass that skips rematches
//! - **Progression**: round start/close preconditions and end detection
//! - **Store**: one JSON snapshot file per tournament
//!
//! Players are always referenced by their stable chess id; nothing in the
//! engine compares by allocation identity, so a reloaded tournament behaves
//! exactly like the live one it was saved from.
//!
//! ## Core Modules
//!
//! - [`tournament`]: entities, pairing, and the progression state machine
//! - [`store`]: the snapshot codec and the file-backed store
//!
//! ## Example
//!
//! ```
//! use chess_tournament::{Player, Tournament, TournamentError};
//!
//! fn main() -> Result<(), TournamentError> {
//!     let mut t = Tournament::new("City Open", "Lyon", "2024-03-01", "2024-03-02", "Spring open")
//!         .with_round_count(2);
//!     t.register_player(Player::new(1, "Ada", "Lovelace", "1815-12-10"))?;
//!     t.register_player(Player::new(2, "Paul", "Morphy", "1837-06-22"))?;
//!
//!     t.start_new_round()?;
//!     t.record_result(0, 1.0, 0.0)?;
//!     t.close_round_if_finished();
//!
//!     // Two players with their only pairing played: nothing left to pair.
//!     assert!(t.is_ended());
//!     Ok(())
//! }
//! ```

/// Engine-wide defaults and domain constants.
pub mod constants;

/// Snapshot codec and file-backed persistence.
pub mod store;
pub use store::{StoreConfig, StoreError, StoreResult, TournamentStore};

/// Core entities, pairing, and tournament progression.
pub mod tournament;
pub use tournament::{
    ChessId, PairedMatch, Player, Points, Round, Tournament, TournamentError, TournamentResult,
};
