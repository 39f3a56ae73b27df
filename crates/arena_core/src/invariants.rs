//! Lifecycle invariants of a match.
//!
//! Checked in debug builds after every transition, and by storage layers
//! when restoring a record.

use crate::rules::check_win;
use crate::{MAX_MOVES, Match, MatchStatus, PlayerId, Square};

/// A logical property that must hold for every reachable match.
pub trait Invariant {
    /// Checks if the invariant holds for the given match.
    fn holds(game: &Match) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Status agrees with seats, turn and winner.
pub struct LifecycleConsistent;

impl Invariant for LifecycleConsistent {
    fn holds(game: &Match) -> bool {
        let seated = game.player2_id().is_some();
        let turn_is_seated = game
            .current_turn_player_id()
            .is_some_and(|player| game.is_participant(player));
        let has_line = |player: Option<PlayerId>| {
            player.is_some_and(|player| check_win(game.board(), player))
        };
        let any_line = has_line(Some(*game.player1_id())) || has_line(*game.player2_id());

        match game.status() {
            MatchStatus::Pending => {
                !seated
                    && game.current_turn_player_id().is_none()
                    && game.winner_id().is_none()
                    && *game.move_count() == 0
            }
            MatchStatus::InProgress => {
                seated
                    && turn_is_seated
                    && game.winner_id().is_none()
                    && *game.move_count() < MAX_MOVES
                    && !any_line
            }
            MatchStatus::Finished => {
                seated
                    && match game.winner_id() {
                        Some(winner) => {
                            game.is_participant(*winner)
                                && has_line(Some(*winner))
                                && !has_line(game.opponent_of(*winner))
                        }
                        None => *game.move_count() == MAX_MOVES && !any_line,
                    }
            }
        }
    }

    fn description() -> &'static str {
        "Status matches seats, turn and winner"
    }
}

/// Move count equals the number of owned squares and never exceeds nine.
pub struct MoveCountMatchesBoard;

impl Invariant for MoveCountMatchesBoard {
    fn holds(game: &Match) -> bool {
        *game.move_count() <= MAX_MOVES
            && usize::from(*game.move_count()) == game.board().occupied_count()
    }

    fn description() -> &'static str {
        "Move count equals occupied squares"
    }
}

/// The two seats hold different players.
pub struct DistinctPlayers;

impl Invariant for DistinctPlayers {
    fn holds(game: &Match) -> bool {
        *game.player2_id() != Some(*game.player1_id())
    }

    fn description() -> &'static str {
        "Player one and player two differ"
    }
}

/// Every owned square belongs to a seated player.
pub struct SquaresOwnedBySeatedPlayers;

impl Invariant for SquaresOwnedBySeatedPlayers {
    fn holds(game: &Match) -> bool {
        game.board().rows().iter().flatten().all(|square| match square {
            Square::Empty => true,
            Square::Occupied(player) => game.is_participant(*player),
        })
    }

    fn description() -> &'static str {
        "Squares are owned by seated players"
    }
}

/// Descriptions of every invariant `game` violates.
pub(crate) fn violations(game: &Match) -> Vec<&'static str> {
    let checks: [(fn(&Match) -> bool, fn() -> &'static str); 4] = [
        (LifecycleConsistent::holds, LifecycleConsistent::description),
        (MoveCountMatchesBoard::holds, MoveCountMatchesBoard::description),
        (DistinctPlayers::holds, DistinctPlayers::description),
        (
            SquaresOwnedBySeatedPlayers::holds,
            SquaresOwnedBySeatedPlayers::description,
        ),
    ];

    checks
        .iter()
        .filter(|(holds, _)| !holds(game))
        .map(|(_, description)| description())
        .collect()
}

/// Panics in debug builds if `game` violates any invariant.
pub(crate) fn assert_invariants(game: &Match) {
    debug_assert!(
        violations(game).is_empty(),
        "Match invariants violated: {:?}",
        violations(game)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, Cell};

    #[test]
    fn test_fresh_match_holds() {
        assert!(violations(&Match::pending(1, 1)).is_empty());
    }

    #[test]
    fn test_pending_with_turn_violates_lifecycle() {
        let game = Match::new(1, 1, None, None, Some(1), Board::new(), MatchStatus::Pending, 0);
        assert_eq!(violations(&game), vec![LifecycleConsistent::description()]);
    }

    #[test]
    fn test_move_count_mismatch_detected() {
        let board = Board::new().with_move(Cell::from_coords(0, 0).unwrap(), 1);
        let game = Match::new(1, 1, Some(2), None, Some(2), board, MatchStatus::InProgress, 2);
        assert!(violations(&game).contains(&MoveCountMatchesBoard::description()));
    }

    #[test]
    fn test_self_match_detected() {
        let game = Match::new(1, 1, Some(1), None, Some(1), Board::new(), MatchStatus::InProgress, 0);
        assert!(violations(&game).contains(&DistinctPlayers::description()));
    }

    #[test]
    fn test_stranger_square_detected() {
        let board = Board::new().with_move(Cell::from_coords(1, 1).unwrap(), 42);
        let game = Match::new(1, 1, Some(2), None, Some(2), board, MatchStatus::InProgress, 1);
        assert!(violations(&game).contains(&SquaresOwnedBySeatedPlayers::description()));
    }

    #[test]
    fn test_in_progress_with_completed_line_detected() {
        let board = Board::from([[1, 1, 1], [2, 2, 0], [0, 0, 0]]);
        let game = Match::new(1, 1, Some(2), None, Some(2), board, MatchStatus::InProgress, 5);
        assert_eq!(violations(&game), vec![LifecycleConsistent::description()]);
    }

    #[test]
    fn test_in_progress_with_full_board_detected() {
        let board = Board::from([[1, 2, 1], [1, 2, 2], [2, 1, 1]]);
        let game = Match::new(1, 1, Some(2), None, Some(2), board, MatchStatus::InProgress, 9);
        assert_eq!(violations(&game), vec![LifecycleConsistent::description()]);
    }

    #[test]
    fn test_draw_with_line_detected() {
        let board = Board::from([[1, 1, 1], [2, 2, 1], [1, 2, 2]]);
        let game = Match::new(1, 1, Some(2), None, Some(1), board, MatchStatus::Finished, 9);
        assert_eq!(violations(&game), vec![LifecycleConsistent::description()]);
    }

    #[test]
    fn test_genuine_draw_holds() {
        let board = Board::from([[1, 2, 1], [1, 2, 2], [2, 1, 1]]);
        let game = Match::new(1, 1, Some(2), None, Some(1), board, MatchStatus::Finished, 9);
        assert!(violations(&game).is_empty());
    }

    #[test]
    fn test_finished_without_line_or_full_board_detected() {
        let game = Match::new(1, 1, Some(2), Some(1), Some(1), Board::new(), MatchStatus::Finished, 0);
        assert!(violations(&game).contains(&LifecycleConsistent::description()));
    }
}
