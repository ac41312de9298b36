//! Swiss-style tournament engine.
//!
//! This module provides the full pairing and round-progression engine:
//! - Entities: [`Player`], [`PairedMatch`], [`Round`], [`Tournament`]
//! - Greedy no-rematch pairing ([`pairing`])
//! - Round/tournament progression and validation ([`state_machine`])
//!
//! The engine is a plain synchronous state machine: one in-memory
//! [`Tournament`] value, driven by an external caller between round start
//! and round close. Persistence lives in [`crate::store`].

pub mod entities;
pub mod pairing;
pub mod state_machine;

pub use entities::{ChessId, PairedMatch, Player, Points, Round, Tournament};
pub use pairing::{generate_pairs, pair_key};
pub use state_machine::{TournamentError, TournamentResult};
