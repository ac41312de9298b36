//! Conversion between a [`Tournament`] and its persisted record.
//!
//! The record layout is JSON-compatible and mirrors the historical
//! snapshot format exactly: matches embed full player records, and the
//! roster's running totals are not stored. Decoding therefore relinks
//! every match side against the decoded roster by chess id, and rebuilds
//! the point ledger by replaying finished matches. A match side whose id
//! is missing from the roster aborts the load; a partially linked
//! tournament is never produced.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{StoreError, StoreResult};
use crate::tournament::entities::{ChessId, PairedMatch, Player, Points, Round, Tournament};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub chess_id: ChessId,
    pub first_name: String,
    pub last_name: String,
    pub birthdate: String,
}

impl From<&Player> for PlayerRecord {
    fn from(player: &Player) -> Self {
        Self {
            chess_id: player.chess_id,
            first_name: player.first_name.clone(),
            last_name: player.last_name.clone(),
            birthdate: player.birthdate.clone(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MatchRecord {
    pub player1: PlayerRecord,
    pub player2: PlayerRecord,
    pub score1: Option<Points>,
    pub score2: Option<Points>,
    pub total_points_player1: Option<Points>,
    pub total_points_player2: Option<Points>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoundRecord {
    pub name: String,
    pub is_finished: bool,
    pub matches: Vec<MatchRecord>,
}

/// The full persisted snapshot of one tournament.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TournamentRecord {
    pub name: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub round_number: u32,
    pub current_round: u32,
    pub players: Vec<PlayerRecord>,
    pub rounds: Vec<RoundRecord>,
}

/// Serialize a tournament into its snapshot record.
///
/// Match sides are emitted as the full roster record for the player, so
/// every id referenced by a match must resolve in the roster.
pub fn encode(tournament: &Tournament) -> StoreResult<TournamentRecord> {
    let player_record = |chess_id: ChessId| -> StoreResult<PlayerRecord> {
        tournament
            .player(chess_id)
            .map(PlayerRecord::from)
            .ok_or(StoreError::UnknownPlayer(chess_id))
    };

    let mut rounds = Vec::with_capacity(tournament.rounds.len());
    for round in &tournament.rounds {
        let mut matches = Vec::with_capacity(round.matches.len());
        for m in &round.matches {
            matches.push(MatchRecord {
                player1: player_record(m.player1)?,
                player2: player_record(m.player2)?,
                score1: m.score1,
                score2: m.score2,
                total_points_player1: m.total_points_player1,
                total_points_player2: m.total_points_player2,
            });
        }
        rounds.push(RoundRecord {
            name: round.name.clone(),
            is_finished: round.is_finished(),
            matches,
        });
    }

    Ok(TournamentRecord {
        name: tournament.name.clone(),
        location: tournament.location.clone(),
        start_date: tournament.start_date.clone(),
        end_date: tournament.end_date.clone(),
        description: tournament.description.clone(),
        round_number: tournament.round_number,
        current_round: tournament.current_round,
        players: tournament.players.iter().map(PlayerRecord::from).collect(),
        rounds,
    })
}

/// Reconstruct a tournament from its snapshot record.
///
/// Round timestamps are not part of the snapshot and come back as `None`;
/// round completion is derived from match state, and a stored
/// `is_finished` flag that disagrees is only worth a warning.
pub fn decode(record: TournamentRecord) -> StoreResult<Tournament> {
    let mut players: Vec<Player> = record
        .players
        .iter()
        .map(|p| Player::new(p.chess_id, &p.first_name, &p.last_name, &p.birthdate))
        .collect();
    let roster: HashSet<ChessId> = players.iter().map(|p| p.chess_id).collect();

    let mut tally: HashMap<ChessId, Points> = HashMap::with_capacity(players.len());
    let mut rounds = Vec::with_capacity(record.rounds.len());
    for round_record in record.rounds {
        let mut matches = Vec::with_capacity(round_record.matches.len());
        for m in &round_record.matches {
            for side in [m.player1.chess_id, m.player2.chess_id] {
                if !roster.contains(&side) {
                    return Err(StoreError::UnknownPlayer(side));
                }
            }
            if let (Some(s1), Some(s2)) = (m.score1, m.score2) {
                *tally.entry(m.player1.chess_id).or_insert(0.0) += s1;
                *tally.entry(m.player2.chess_id).or_insert(0.0) += s2;
            }
            matches.push(PairedMatch {
                player1: m.player1.chess_id,
                player2: m.player2.chess_id,
                score1: m.score1,
                score2: m.score2,
                total_points_player1: m.total_points_player1,
                total_points_player2: m.total_points_player2,
            });
        }

        let round = Round::new(round_record.name, matches);
        if round.is_finished() != round_record.is_finished {
            warn!(
                "{}: stored finished flag for {} disagrees with match state",
                record.name, round.name
            );
        }
        rounds.push(round);
    }

    for player in &mut players {
        player.points = tally.get(&player.chess_id).copied().unwrap_or(0.0);
    }

    Ok(Tournament {
        name: record.name,
        location: record.location,
        start_date: record.start_date,
        end_date: record.end_date,
        description: record.description,
        round_number: record.round_number,
        current_round: record.current_round,
        rounds,
        players,
    })
}
