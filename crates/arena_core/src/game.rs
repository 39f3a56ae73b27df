//! Match lifecycle state machine.
//!
//! ```text
//! pending ──join──▶ in_progress ──winning or ninth move──▶ finished
//! ```
//!
//! No transition skips a state and none reverses. Validation always
//! completes before a new state is built, so a rejected request never
//! yields a partially mutated match.

use crate::invariants::{assert_invariants, violations};
use crate::rules::{check_win, is_draw};
use crate::{Board, Cell, ConflictReason, ForbiddenReason, MatchError, MatchId, PlayerId};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Lifecycle status of a match.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchStatus {
    /// Waiting for a second player.
    Pending,
    /// Both players seated, moves accepted.
    InProgress,
    /// Won or drawn. Terminal.
    Finished,
}

/// Result of a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Player completed a line.
    Winner(PlayerId),
    /// Board filled with no line.
    Draw,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            Outcome::Winner(player) => Some(*player),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the match was drawn.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(player) => write!(f, "Player {} wins", player),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}

/// One game between two players.
///
/// The derived constructor restores a match from storage; use
/// [`Match::pending`] to start a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Match {
    id: MatchId,
    player1_id: PlayerId,
    player2_id: Option<PlayerId>,
    winner_id: Option<PlayerId>,
    current_turn_player_id: Option<PlayerId>,
    board: Board,
    status: MatchStatus,
    move_count: u8,
}

impl Match {
    /// Creates a match waiting for a second player.
    #[instrument]
    pub fn pending(id: MatchId, player1_id: PlayerId) -> Self {
        Self {
            id,
            player1_id,
            player2_id: None,
            winner_id: None,
            current_turn_player_id: None,
            board: Board::new(),
            status: MatchStatus::Pending,
            move_count: 0,
        }
    }

    /// Seats `player2_id` and starts the match with player one to move.
    ///
    /// # Errors
    ///
    /// - `Conflict(PlayerAlreadyInGame)` if `player2_id` created the match,
    ///   whatever the status
    /// - `Conflict(GameFull)` if the second seat is taken
    #[instrument(skip(self), fields(match_id = self.id, status = %self.status))]
    pub fn join(&self, player2_id: PlayerId) -> Result<Self, MatchError> {
        if player2_id == self.player1_id {
            warn!(player2_id, "Player tried to join own match");
            return Err(ConflictReason::PlayerAlreadyInGame.into());
        }
        if self.player2_id.is_some() {
            warn!(player2_id, "Match already has two players");
            return Err(ConflictReason::GameFull.into());
        }

        let next = Self {
            player2_id: Some(player2_id),
            status: MatchStatus::InProgress,
            current_turn_player_id: Some(self.player1_id),
            ..self.clone()
        };

        info!(player2_id, first_to_move = self.player1_id, "Match started");
        assert_invariants(&next);
        Ok(next)
    }

    /// Places `player_id`'s mark at `(row, col)` and returns the next state.
    ///
    /// Checks run in a fixed order (status, turn, bounds, occupancy) which
    /// decides the reported error when several apply.
    ///
    /// # Errors
    ///
    /// - `Conflict(NotInProgress)` unless the match is in progress
    /// - `Forbidden(NotYourTurn)` if another player is to move
    /// - `Conflict(InvalidCell)` if the coordinates are off the board
    /// - `Conflict(CellOccupied)` if the square is taken
    #[instrument(skip(self), fields(match_id = self.id, move_count = self.move_count))]
    pub fn apply_move(&self, player_id: PlayerId, row: i32, col: i32) -> Result<Self, MatchError> {
        if self.status != MatchStatus::InProgress {
            warn!(status = %self.status, "Move on match that is not in progress");
            return Err(ConflictReason::NotInProgress.into());
        }
        if self.current_turn_player_id != Some(player_id) {
            warn!(expected = ?self.current_turn_player_id, "Move out of turn");
            return Err(ForbiddenReason::NotYourTurn.into());
        }
        let cell = Cell::from_coords(row, col).ok_or_else(|| {
            warn!("Move outside the board");
            MatchError::from(ConflictReason::InvalidCell)
        })?;
        if self.board.is_occupied(cell) {
            warn!(owner = ?self.board.get(cell), "Move onto occupied square");
            return Err(ConflictReason::CellOccupied.into());
        }

        let board = self.board.with_move(cell, player_id);
        let move_count = self.move_count + 1;
        let mut next = Self {
            board,
            move_count,
            ..self.clone()
        };

        if check_win(&board, player_id) {
            next.winner_id = Some(player_id);
            next.status = MatchStatus::Finished;
            info!(winner = player_id, move_count, "Match won");
        } else if is_draw(&board, move_count, player_id) {
            next.status = MatchStatus::Finished;
            info!(move_count, "Match drawn");
        } else {
            next.current_turn_player_id = self.opponent_of(player_id);
            debug!(next_to_move = ?next.current_turn_player_id, "Turn passed");
        }

        assert_invariants(&next);
        Ok(next)
    }

    /// Returns the other seated player, if both seats are filled.
    pub fn opponent_of(&self, player_id: PlayerId) -> Option<PlayerId> {
        match self.player2_id {
            Some(player2) if player_id == self.player1_id => Some(player2),
            Some(player2) if player_id == player2 => Some(self.player1_id),
            _ => None,
        }
    }

    /// Returns true if `player_id` holds either seat.
    pub fn is_participant(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id || self.player2_id == Some(player_id)
    }

    /// Outcome of a finished match, `None` while still playable.
    pub fn outcome(&self) -> Option<Outcome> {
        match (self.status, self.winner_id) {
            (MatchStatus::Finished, Some(winner)) => Some(Outcome::Winner(winner)),
            (MatchStatus::Finished, None) => Some(Outcome::Draw),
            _ => None,
        }
    }

    /// Descriptions of every lifecycle invariant this match violates.
    ///
    /// Empty for any state reachable through [`Match::pending`],
    /// [`Match::join`] and [`Match::apply_move`].
    pub fn violations(&self) -> Vec<&'static str> {
        violations(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: PlayerId = 1;
    const BOB: PlayerId = 2;

    fn started() -> Match {
        Match::pending(1, ALICE).join(BOB).unwrap()
    }

    fn play(game: Match, moves: &[(PlayerId, i32, i32)]) -> Match {
        moves.iter().fold(game, |game, &(player, row, col)| {
            game.apply_move(player, row, col).unwrap()
        })
    }

    #[test]
    fn test_pending_match_is_empty() {
        let game = Match::pending(7, ALICE);
        assert_eq!(*game.status(), MatchStatus::Pending);
        assert_eq!(*game.player2_id(), None);
        assert_eq!(*game.current_turn_player_id(), None);
        assert_eq!(*game.move_count(), 0);
        assert_eq!(game.board().occupied_count(), 0);
        assert!(game.violations().is_empty());
    }

    #[test]
    fn test_join_starts_match_with_creator_to_move() {
        let game = started();
        assert_eq!(*game.status(), MatchStatus::InProgress);
        assert_eq!(*game.player2_id(), Some(BOB));
        assert_eq!(*game.current_turn_player_id(), Some(ALICE));
    }

    #[test]
    fn test_join_full_match_conflicts() {
        let result = started().join(3);
        assert_eq!(result, Err(MatchError::Conflict(ConflictReason::GameFull)));
    }

    #[test]
    fn test_self_join_conflicts_in_every_status() {
        let pending = Match::pending(1, ALICE);
        let in_progress = started();
        let finished = play(
            started(),
            &[(ALICE, 0, 0), (BOB, 1, 0), (ALICE, 0, 1), (BOB, 1, 1), (ALICE, 0, 2)],
        );
        for game in [pending, in_progress, finished] {
            assert_eq!(
                game.join(ALICE),
                Err(MatchError::Conflict(ConflictReason::PlayerAlreadyInGame))
            );
        }
    }

    #[test]
    fn test_move_on_pending_match_conflicts() {
        let result = Match::pending(1, ALICE).apply_move(ALICE, 0, 0);
        assert_eq!(result, Err(MatchError::Conflict(ConflictReason::NotInProgress)));
    }

    #[test]
    fn test_move_out_of_turn_forbidden() {
        let result = started().apply_move(BOB, 0, 0);
        assert_eq!(result, Err(MatchError::Forbidden(ForbiddenReason::NotYourTurn)));
    }

    #[test]
    fn test_stranger_move_forbidden() {
        let result = started().apply_move(99, 0, 0);
        assert_eq!(result, Err(MatchError::Forbidden(ForbiddenReason::NotYourTurn)));
    }

    #[test]
    fn test_move_off_board_conflicts() {
        let game = started();
        for (row, col) in [(3, 0), (0, 3), (-1, 0), (0, -1)] {
            assert_eq!(
                game.apply_move(ALICE, row, col),
                Err(MatchError::Conflict(ConflictReason::InvalidCell))
            );
        }
    }

    #[test]
    fn test_move_onto_occupied_square_conflicts() {
        let game = play(started(), &[(ALICE, 1, 1)]);
        assert_eq!(
            game.apply_move(BOB, 1, 1),
            Err(MatchError::Conflict(ConflictReason::CellOccupied))
        );
    }

    #[test]
    fn test_validation_order_status_before_turn() {
        // Pending match, wrong player, bad cell: status wins.
        let result = Match::pending(1, ALICE).apply_move(BOB, 9, 9);
        assert_eq!(result, Err(MatchError::Conflict(ConflictReason::NotInProgress)));
    }

    #[test]
    fn test_validation_order_turn_before_bounds() {
        let result = started().apply_move(BOB, 9, 9);
        assert_eq!(result, Err(MatchError::Forbidden(ForbiddenReason::NotYourTurn)));
    }

    #[test]
    fn test_validation_order_bounds_before_occupancy() {
        let game = play(started(), &[(ALICE, 0, 0), (BOB, 1, 1)]);
        assert_eq!(
            game.apply_move(ALICE, 3, 3),
            Err(MatchError::Conflict(ConflictReason::InvalidCell))
        );
    }

    #[test]
    fn test_rejected_move_leaves_match_unchanged() {
        let game = play(started(), &[(ALICE, 0, 0)]);
        let before = game.clone();
        let _ = game.apply_move(BOB, 0, 0);
        assert_eq!(game, before);
    }

    #[test]
    fn test_turns_alternate() {
        let mut game = started();
        let moves = [(ALICE, 0, 0), (BOB, 1, 1), (ALICE, 2, 2), (BOB, 0, 2)];
        for (count, &(player, row, col)) in moves.iter().enumerate() {
            game = game.apply_move(player, row, col).unwrap();
            assert_ne!(*game.current_turn_player_id(), Some(player));
            assert_eq!(usize::from(*game.move_count()), count + 1);
            assert_eq!(game.board().occupied_count(), count + 1);
        }
    }

    #[test]
    fn test_top_row_win() {
        let game = play(
            started(),
            &[(ALICE, 0, 0), (BOB, 1, 0), (ALICE, 0, 1), (BOB, 1, 1), (ALICE, 0, 2)],
        );
        assert_eq!(*game.status(), MatchStatus::Finished);
        assert_eq!(*game.winner_id(), Some(ALICE));
        assert_eq!(*game.move_count(), 5);
        assert_eq!(game.outcome(), Some(Outcome::Winner(ALICE)));
        assert!(game.violations().is_empty());
    }

    #[test]
    fn test_finished_match_rejects_moves() {
        let game = play(
            started(),
            &[(ALICE, 0, 0), (BOB, 1, 0), (ALICE, 0, 1), (BOB, 1, 1), (ALICE, 0, 2)],
        );
        for player in [ALICE, BOB] {
            assert_eq!(
                game.apply_move(player, 2, 2),
                Err(MatchError::Conflict(ConflictReason::NotInProgress))
            );
        }
    }

    #[test]
    fn test_full_board_draw() {
        // A B A / A B B / B A A
        let game = play(
            started(),
            &[
                (ALICE, 0, 0),
                (BOB, 0, 1),
                (ALICE, 0, 2),
                (BOB, 1, 1),
                (ALICE, 1, 0),
                (BOB, 1, 2),
                (ALICE, 2, 1),
                (BOB, 2, 0),
                (ALICE, 2, 2),
            ],
        );
        assert_eq!(*game.status(), MatchStatus::Finished);
        assert_eq!(*game.winner_id(), None);
        assert_eq!(*game.move_count(), 9);
        assert_eq!(game.outcome(), Some(Outcome::Draw));
        assert!(Outcome::Draw.is_draw());
        assert_eq!(Outcome::Draw.winner(), None);
    }

    #[test]
    fn test_ninth_move_win_is_not_draw() {
        // A B A / B A B / B A A: the ninth move completes the diagonal.
        let game = play(
            started(),
            &[
                (ALICE, 0, 0),
                (BOB, 0, 1),
                (ALICE, 0, 2),
                (BOB, 1, 0),
                (ALICE, 1, 1),
                (BOB, 1, 2),
                (ALICE, 2, 1),
                (BOB, 2, 0),
                (ALICE, 2, 2),
            ],
        );
        assert_eq!(*game.move_count(), 9);
        assert_eq!(game.outcome(), Some(Outcome::Winner(ALICE)));
        let outcome = Outcome::Winner(ALICE);
        assert_eq!(outcome.winner(), Some(ALICE));
        assert!(!outcome.is_draw());
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        use std::str::FromStr;
        for status in [MatchStatus::Pending, MatchStatus::InProgress, MatchStatus::Finished] {
            assert_eq!(MatchStatus::from_str(status.as_ref()).unwrap(), status);
        }
        assert_eq!(MatchStatus::InProgress.to_string(), "in_progress");
    }
}
