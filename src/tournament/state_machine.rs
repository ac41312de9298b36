//! Round and tournament progression.
//!
//! All state transitions live here: registering players, starting rounds,
//! recording match results, closing rounds, and detecting the terminal
//! state. Every operation validates its preconditions before mutating
//! anything, so a failed call always leaves the tournament unchanged and
//! retryable.

use log::{debug, info};
use rand::seq::SliceRandom;
use std::collections::HashSet;
use thiserror::Error;

use super::entities::{ChessId, PairedMatch, Player, Points, Round, Tournament};
use super::pairing::{generate_pairs, pair_key};
use crate::constants::LEGAL_OUTCOMES;

/// Errors reported by tournament progression operations.
///
/// None of these are fatal: the tournament is left consistent and the
/// caller may retry after fixing the condition.
#[derive(Debug, Error, PartialEq)]
pub enum TournamentError {
    #[error("no players registered")]
    EmptyRoster,
    #[error("roster size must be even, have {count} players")]
    OddPlayerCount { count: usize },
    #[error("player with chess id {0} is already registered")]
    DuplicatePlayer(ChessId),
    #[error("previous round is not finished")]
    RoundInProgress,
    #[error("tournament has ended, no further round can be started")]
    TournamentEnded,
    #[error("no round in progress")]
    NoRoundInProgress,
    #[error("no match at index {index} in the current round")]
    MatchNotFound { index: usize },
    #[error("match at index {index} already has a result")]
    MatchAlreadyScored { index: usize },
    #[error("illegal outcome {score1}-{score2}, expected 1-0, 0-1, or 0.5-0.5")]
    InvalidOutcome { score1: Points, score2: Points },
    #[error("player with chess id {0} is not in the roster")]
    UnknownPlayer(ChessId),
}

pub type TournamentResult<T> = Result<T, TournamentError>;

impl Tournament {
    /// Register a player. Duplicate chess ids are rejected, never silently
    /// ignored.
    pub fn register_player(&mut self, player: Player) -> TournamentResult<()> {
        if self.player(player.chess_id).is_some() {
            return Err(TournamentError::DuplicatePlayer(player.chess_id));
        }
        debug!("registered {} for {}", player.full_name(), self.name);
        self.players.push(player);
        Ok(())
    }

    /// Every unordered player pair that already has a match, across all
    /// rounds. Open matches count: a pairing exists as soon as it is made.
    #[must_use]
    pub fn played_pairs(&self) -> HashSet<(ChessId, ChessId)> {
        self.rounds
            .iter()
            .flat_map(|round| round.matches.iter())
            .map(|m| pair_key(m.player1, m.player2))
            .collect()
    }

    /// Start the next round.
    ///
    /// The roster is shuffled uniformly for the first round and sorted by
    /// descending points (ties broken by ascending chess id) for every
    /// later one, then paired greedily against the match history. Players
    /// left without an opponent sit the round out; no bye match is
    /// created.
    pub fn start_new_round(&mut self) -> TournamentResult<()> {
        self.validate_roster()?;
        if let Some(last) = self.rounds.last()
            && !last.is_finished()
        {
            return Err(TournamentError::RoundInProgress);
        }

        if self.rounds.is_empty() {
            self.players.shuffle(&mut rand::rng());
        } else {
            self.players
                .sort_by(|a, b| b.points.total_cmp(&a.points).then(a.chess_id.cmp(&b.chess_id)));
        }

        if self.is_ended() {
            return Err(TournamentError::TournamentEnded);
        }

        let history = self.played_pairs();
        let order: Vec<ChessId> = self.players.iter().map(|p| p.chess_id).collect();
        let (pairs, unmatched) = generate_pairs(&order, &history);
        if !unmatched.is_empty() {
            debug!("sitting out round {}: {unmatched:?}", self.current_round);
        }

        let matches = pairs
            .into_iter()
            .map(|(player1, player2)| PairedMatch::new(player1, player2))
            .collect();
        let mut round = Round::new(format!("Round {}", self.current_round), matches);
        round.start();
        info!(
            "{}: started {} with {} matches",
            self.name,
            round.name,
            round.matches.len()
        );
        self.rounds.push(round);
        self.current_round += 1;
        Ok(())
    }

    /// Record the outcome of a match in the round in progress, addressed
    /// by its index in the round's match list.
    ///
    /// The outcome combination must be exactly 1-0, 0-1, or 0.5-0.5. On
    /// any error the match stays open and no points are credited.
    pub fn record_result(
        &mut self,
        match_index: usize,
        score1: Points,
        score2: Points,
    ) -> TournamentResult<()> {
        let (player1, player2) = {
            let round = self
                .rounds
                .last()
                .ok_or(TournamentError::NoRoundInProgress)?;
            let m = round
                .matches
                .get(match_index)
                .ok_or(TournamentError::MatchNotFound { index: match_index })?;
            if m.is_finished() {
                return Err(TournamentError::MatchAlreadyScored { index: match_index });
            }
            (m.player1, m.player2)
        };
        if !LEGAL_OUTCOMES.contains(&(score1, score2)) {
            return Err(TournamentError::InvalidOutcome { score1, score2 });
        }
        if self.player(player1).is_none() {
            return Err(TournamentError::UnknownPlayer(player1));
        }
        if self.player(player2).is_none() {
            return Err(TournamentError::UnknownPlayer(player2));
        }

        // All checks passed; credit the ledger exactly once per side, then
        // close the match with totals-as-of-now snapshots.
        let total1 = self.credit(player1, score1);
        let total2 = self.credit(player2, score2);
        if let Some(round) = self.rounds.last_mut()
            && let Some(m) = round.matches.get_mut(match_index)
        {
            m.score1 = Some(score1);
            m.score2 = Some(score2);
            m.total_points_player1 = Some(total1);
            m.total_points_player2 = Some(total2);
        }
        debug!("{}: match {match_index} recorded {score1}-{score2}", self.name);
        Ok(())
    }

    /// Stamp the current round's end time once every match in it is
    /// finished. Returns whether the round is finished.
    pub fn close_round_if_finished(&mut self) -> bool {
        let name = &self.name;
        match self.rounds.last_mut() {
            Some(round) if round.is_finished() => {
                if round.ended_at.is_none() {
                    round.end();
                    info!("{name}: closed {}", round.name);
                }
                true
            }
            _ => false,
        }
    }

    /// Whether the tournament has reached its terminal state: either the
    /// target round count is reached, or no further pairing is possible.
    ///
    /// The pairing probe runs against a score-ranked view of the roster
    /// and mutates nothing.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        if self.rounds.len() >= self.round_number as usize {
            return true;
        }
        let history = self.played_pairs();
        let (pairs, _) = generate_pairs(&self.ranked_order(), &history);
        pairs.is_empty()
    }

    /// A player's accumulated points, or `None` for an unknown id.
    #[must_use]
    pub fn points_for(&self, chess_id: ChessId) -> Option<Points> {
        self.player(chess_id).map(|p| p.points)
    }

    /// Roster sorted by surname, then first name, for listings.
    #[must_use]
    pub fn players_by_name(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.iter().collect();
        players.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        players
    }

    fn validate_roster(&self) -> TournamentResult<()> {
        if self.players.is_empty() {
            return Err(TournamentError::EmptyRoster);
        }
        if self.players.len() % 2 != 0 {
            return Err(TournamentError::OddPlayerCount {
                count: self.players.len(),
            });
        }
        let mut seen = HashSet::with_capacity(self.players.len());
        for player in &self.players {
            if !seen.insert(player.chess_id) {
                return Err(TournamentError::DuplicatePlayer(player.chess_id));
            }
        }
        Ok(())
    }

    /// Chess ids ranked the way a non-first round would order the roster.
    fn ranked_order(&self) -> Vec<ChessId> {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.points.total_cmp(&a.points).then(a.chess_id.cmp(&b.chess_id)));
        ranked.into_iter().map(|p| p.chess_id).collect()
    }

    fn credit(&mut self, chess_id: ChessId, score: Points) -> Points {
        match self.player_mut(chess_id) {
            Some(player) => {
                player.points += score;
                player.points
            }
            // Unreachable after the roster checks in record_result.
            None => score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_player_tournament(round_number: u32) -> Tournament {
        let mut t = Tournament::new("City Open", "Lyon", "2024-03-01", "2024-03-02", "")
            .with_round_count(round_number);
        t.register_player(Player::new(1, "Ada", "Lovelace", "1815-12-10"))
            .unwrap();
        t.register_player(Player::new(2, "Paul", "Morphy", "1837-06-22"))
            .unwrap();
        t.register_player(Player::new(3, "Vera", "Menchik", "1906-02-16"))
            .unwrap();
        t.register_player(Player::new(4, "Gioachino", "Greco", "1600-01-01"))
            .unwrap();
        t
    }

    fn finish_current_round(t: &mut Tournament) {
        let match_count = t.latest_round().map(|r| r.matches.len()).unwrap_or(0);
        for i in 0..match_count {
            t.record_result(i, 1.0, 0.0).unwrap();
        }
        assert!(t.close_round_if_finished());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut t = four_player_tournament(4);
        let err = t
            .register_player(Player::new(1, "Another", "Ada", "1900-01-01"))
            .unwrap_err();
        assert_eq!(err, TournamentError::DuplicatePlayer(1));
        assert_eq!(t.players.len(), 4);
    }

    #[test]
    fn test_start_round_requires_players() {
        let mut t = Tournament::new("Empty", "Lyon", "2024-03-01", "2024-03-02", "");
        assert_eq!(t.start_new_round().unwrap_err(), TournamentError::EmptyRoster);
        assert!(t.rounds.is_empty());
    }

    #[test]
    fn test_start_round_requires_even_roster() {
        let mut t = Tournament::new("Odd", "Lyon", "2024-03-01", "2024-03-02", "");
        for id in 1..=3 {
            t.register_player(Player::new(id, "P", "Q", "2000-01-01"))
                .unwrap();
        }
        assert_eq!(
            t.start_new_round().unwrap_err(),
            TournamentError::OddPlayerCount { count: 3 }
        );
        assert!(t.rounds.is_empty());
        assert_eq!(t.current_round, 1);
    }

    #[test]
    fn test_first_round_pairs_everyone() {
        let mut t = four_player_tournament(4);
        t.start_new_round().unwrap();

        assert_eq!(t.rounds.len(), 1);
        assert_eq!(t.current_round, 2);
        let round = t.latest_round().unwrap();
        assert_eq!(round.name, "Round 1");
        assert_eq!(round.matches.len(), 2);
        assert!(round.started_at.is_some());
        assert!(round.ended_at.is_none());

        // Every roster member appears in exactly one match.
        let mut seen: Vec<ChessId> = round
            .matches
            .iter()
            .flat_map(|m| [m.player1, m.player2])
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_cannot_start_round_while_previous_open() {
        let mut t = four_player_tournament(4);
        t.start_new_round().unwrap();
        assert_eq!(
            t.start_new_round().unwrap_err(),
            TournamentError::RoundInProgress
        );
        assert_eq!(t.rounds.len(), 1);
    }

    #[test]
    fn test_win_and_draw_credit_the_ledger() {
        let mut t = four_player_tournament(4);
        t.start_new_round().unwrap();

        let round = t.latest_round().unwrap();
        let (w, l) = (round.matches[0].player1, round.matches[0].player2);
        let (d1, d2) = (round.matches[1].player1, round.matches[1].player2);

        t.record_result(0, 1.0, 0.0).unwrap();
        t.record_result(1, 0.5, 0.5).unwrap();

        assert_eq!(t.points_for(w), Some(1.0));
        assert_eq!(t.points_for(l), Some(0.0));
        assert_eq!(t.points_for(d1), Some(0.5));
        assert_eq!(t.points_for(d2), Some(0.5));

        let m = &t.latest_round().unwrap().matches[0];
        assert_eq!(m.total_points_player1, Some(1.0));
        assert_eq!(m.total_points_player2, Some(0.0));
    }

    #[test]
    fn test_illegal_outcome_leaves_match_open() {
        let mut t = four_player_tournament(4);
        t.start_new_round().unwrap();

        for (s1, s2) in [(2.0, 0.0), (1.0, 1.0), (0.5, 0.0), (0.0, 0.0)] {
            assert_eq!(
                t.record_result(0, s1, s2).unwrap_err(),
                TournamentError::InvalidOutcome {
                    score1: s1,
                    score2: s2
                }
            );
        }
        assert!(!t.latest_round().unwrap().matches[0].is_finished());
        assert!(t.players.iter().all(|p| p.points == 0.0));
    }

    #[test]
    fn test_result_not_revisable() {
        let mut t = four_player_tournament(4);
        t.start_new_round().unwrap();
        t.record_result(0, 1.0, 0.0).unwrap();
        assert_eq!(
            t.record_result(0, 0.0, 1.0).unwrap_err(),
            TournamentError::MatchAlreadyScored { index: 0 }
        );
    }

    #[test]
    fn test_record_result_without_round() {
        let mut t = four_player_tournament(4);
        assert_eq!(
            t.record_result(0, 1.0, 0.0).unwrap_err(),
            TournamentError::NoRoundInProgress
        );
    }

    #[test]
    fn test_record_result_bad_index() {
        let mut t = four_player_tournament(4);
        t.start_new_round().unwrap();
        assert_eq!(
            t.record_result(9, 1.0, 0.0).unwrap_err(),
            TournamentError::MatchNotFound { index: 9 }
        );
    }

    #[test]
    fn test_close_round_stamps_end_time_once() {
        let mut t = four_player_tournament(4);
        t.start_new_round().unwrap();
        assert!(!t.close_round_if_finished());
        assert!(t.latest_round().unwrap().ended_at.is_none());

        t.record_result(0, 1.0, 0.0).unwrap();
        t.record_result(1, 0.5, 0.5).unwrap();
        assert!(t.close_round_if_finished());
        let first_stamp = t.latest_round().unwrap().ended_at;
        assert!(first_stamp.is_some());

        assert!(t.close_round_if_finished());
        assert_eq!(t.latest_round().unwrap().ended_at, first_stamp);
    }

    #[test]
    fn test_no_rematch_across_rounds() {
        let mut t = four_player_tournament(4);
        t.start_new_round().unwrap();
        let first: HashSet<_> = t.played_pairs();
        finish_current_round(&mut t);

        t.start_new_round().unwrap();
        let second_round_pairs: Vec<_> = t
            .latest_round()
            .unwrap()
            .matches
            .iter()
            .map(|m| pair_key(m.player1, m.player2))
            .collect();
        for pair in &second_round_pairs {
            assert!(!first.contains(pair), "rematch {pair:?}");
        }
        // With 4 players, the second round still pairs everyone.
        assert_eq!(second_round_pairs.len(), 2);
    }

    #[test]
    fn test_second_round_ordered_by_points() {
        let mut t = four_player_tournament(4);
        t.start_new_round().unwrap();
        finish_current_round(&mut t);

        t.start_new_round().unwrap();
        // finish_current_round awarded 1-0 in both matches, so the two
        // winners lead the re-ordered roster.
        let winners: Vec<ChessId> = t
            .players
            .iter()
            .take(2)
            .map(|p| p.chess_id)
            .collect();
        for id in winners {
            assert_eq!(t.points_for(id), Some(1.0));
        }
    }

    #[test]
    fn test_tournament_ends_after_target_rounds() {
        let mut t = four_player_tournament(2);
        t.start_new_round().unwrap();
        finish_current_round(&mut t);
        assert!(!t.is_ended());

        t.start_new_round().unwrap();
        finish_current_round(&mut t);
        assert!(t.is_ended());
        assert_eq!(
            t.start_new_round().unwrap_err(),
            TournamentError::TournamentEnded
        );
        assert_eq!(t.rounds.len(), 2);
    }

    #[test]
    fn test_tournament_ends_when_no_pairing_possible() {
        let mut t = Tournament::new("Duel", "Lyon", "2024-03-01", "2024-03-02", "")
            .with_round_count(5);
        t.register_player(Player::new(1, "Ada", "Lovelace", "1815-12-10"))
            .unwrap();
        t.register_player(Player::new(2, "Paul", "Morphy", "1837-06-22"))
            .unwrap();

        t.start_new_round().unwrap();
        finish_current_round(&mut t);

        // The only possible pairing is in the history now.
        assert!(t.is_ended());
        assert_eq!(
            t.start_new_round().unwrap_err(),
            TournamentError::TournamentEnded
        );
        assert_eq!(t.rounds.len(), 1);
    }

    #[test]
    fn test_is_ended_is_side_effect_free() {
        let mut t = four_player_tournament(4);
        t.start_new_round().unwrap();
        finish_current_round(&mut t);

        let before = t.clone();
        let _ = t.is_ended();
        assert_eq!(t, before);
    }

    #[test]
    fn test_players_by_name_sorts_by_surname() {
        let t = four_player_tournament(4);
        let names: Vec<&str> = t
            .players_by_name()
            .iter()
            .map(|p| p.last_name.as_str())
            .collect();
        assert_eq!(names, vec!["Greco", "Lovelace", "Menchik", "Morphy"]);
    }
}
