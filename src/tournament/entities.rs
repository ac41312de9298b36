//! Core tournament entities: players, matches, rounds, and the tournament
//! itself.
//!
//! Matches never own their players. Every cross-entity reference is a
//! [`ChessId`], and lookups always go through the tournament roster, so
//! score and rematch comparisons stay exact no matter how a tournament was
//! built or restored.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::constants;

/// Externally assigned, stable player identifier.
pub type ChessId = u32;

/// Accumulated tournament points. Match outcomes are drawn from
/// {0, 0.5, 1}, so totals are always multiples of 0.5.
pub type Points = f64;

/// A registered tournament participant.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub chess_id: ChessId,
    pub first_name: String,
    pub last_name: String,
    /// Opaque date string, kept exactly as registered.
    pub birthdate: String,
    /// Running total, credited once per finished match.
    pub points: Points,
}

impl Player {
    pub fn new(chess_id: ChessId, first_name: &str, last_name: &str, birthdate: &str) -> Self {
        Self {
            chess_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            birthdate: birthdate.to_string(),
            points: 0.0,
        }
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (Chess ID: {}, Birthdate: {})",
            self.last_name, self.first_name, self.chess_id, self.birthdate
        )
    }
}

/// One contest between two distinct players.
///
/// A match is open until both scores are set, and a result is recorded at
/// most once. The `total_points_*` fields snapshot each side's running
/// total as of the moment the result was recorded; they exist for
/// reporting and persistence only.
#[derive(Clone, Debug, PartialEq)]
pub struct PairedMatch {
    pub player1: ChessId,
    pub player2: ChessId,
    pub score1: Option<Points>,
    pub score2: Option<Points>,
    pub total_points_player1: Option<Points>,
    pub total_points_player2: Option<Points>,
}

impl PairedMatch {
    pub fn new(player1: ChessId, player2: ChessId) -> Self {
        Self {
            player1,
            player2,
            score1: None,
            score2: None,
            total_points_player1: None,
            total_points_player2: None,
        }
    }

    /// A match is finished once both outcomes are present.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.score1.is_some() && self.score2.is_some()
    }
}

impl fmt::Display for PairedMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match (self.score1, self.score2) {
            (Some(s1), Some(s2)) => {
                format!("#{} vs #{} - Scores: {s1}-{s2}", self.player1, self.player2)
            }
            _ => format!("#{} vs #{} - open", self.player1, self.player2),
        };
        write!(f, "{repr}")
    }
}

/// An ordered batch of matches played within one step of the tournament.
///
/// Membership is fixed at construction; only match outcomes mutate
/// afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Round {
    pub name: String,
    pub matches: Vec<PairedMatch>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Round {
    pub fn new(name: String, matches: Vec<PairedMatch>) -> Self {
        Self {
            name,
            matches,
            started_at: None,
            ended_at: None,
        }
    }

    /// A round is finished once every match in it is finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.matches.iter().all(PairedMatch::is_finished)
    }

    /// Stamp the round's wall-clock start.
    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
    }

    /// Stamp the round's wall-clock end.
    pub fn end(&mut self) {
        self.ended_at = Some(Utc::now());
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stamp = |ts: Option<DateTime<Utc>>| match ts {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "N/A".to_string(),
        };
        write!(
            f,
            "{} - Matches: {} - Start Time: {} - End Time: {}",
            self.name,
            self.matches.len(),
            stamp(self.started_at),
            stamp(self.ended_at),
        )
    }
}

/// A Swiss-style tournament over a fixed roster of players.
///
/// Created once, then mutated through the progression operations in
/// [`state_machine`](super::state_machine) until [`is_ended`] reports the
/// terminal state.
///
/// [`is_ended`]: Tournament::is_ended
#[derive(Clone, Debug, PartialEq)]
pub struct Tournament {
    pub name: String,
    pub location: String,
    /// Opaque date strings, never interpreted by the engine.
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    /// Target number of rounds.
    pub round_number: u32,
    /// 1-based counter naming the next round to be started.
    pub current_round: u32,
    pub rounds: Vec<Round>,
    /// Roster in registration order until the first round re-orders it.
    pub players: Vec<Player>,
}

impl Tournament {
    /// Create a tournament targeting [`constants::DEFAULT_ROUND_COUNT`]
    /// rounds.
    pub fn new(
        name: &str,
        location: &str,
        start_date: &str,
        end_date: &str,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            location: location.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            description: description.to_string(),
            round_number: constants::DEFAULT_ROUND_COUNT,
            current_round: 1,
            rounds: Vec::new(),
            players: Vec::new(),
        }
    }

    /// Override the target round count.
    #[must_use]
    pub fn with_round_count(mut self, round_number: u32) -> Self {
        self.round_number = round_number;
        self
    }

    /// Look up a roster entry by id.
    #[must_use]
    pub fn player(&self, chess_id: ChessId) -> Option<&Player> {
        self.players.iter().find(|p| p.chess_id == chess_id)
    }

    pub(crate) fn player_mut(&mut self, chess_id: ChessId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.chess_id == chess_id)
    }

    /// The most recently created round, if any.
    #[must_use]
    pub fn latest_round(&self) -> Option<&Round> {
        self.rounds.last()
    }
}

impl fmt::Display for Tournament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tournament: {}, Location: {}, Start Date: {}, End Date: {}, \
             Current Round: {}, Max Rounds: {}, Description: {}",
            self.name,
            self.location,
            self.start_date,
            self.end_date,
            self.current_round,
            self.round_number,
            self.description,
        )
    }
}
