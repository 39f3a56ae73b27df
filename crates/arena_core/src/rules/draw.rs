//! Draw detection.

use super::win::check_win;
use crate::{Board, MAX_MOVES, PlayerId};
use tracing::instrument;

/// Returns true if the move just made by `last_mover` filled the board
/// without completing a line.
///
/// A ninth move that wins is a win, not a draw.
#[instrument(skip(board))]
pub fn is_draw(board: &Board, move_count: u8, last_mover: PlayerId) -> bool {
    move_count == MAX_MOVES && !check_win(board, last_mover)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, RawBoard};

    #[test]
    fn test_partial_board_is_not_draw() {
        let board = Board::new().with_move(Cell::from_coords(1, 1).unwrap(), 1);
        assert!(!is_draw(&board, 1, 1));
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        // 1 2 1 / 1 2 2 / 2 1 1
        let raw: RawBoard = [[1, 2, 1], [1, 2, 2], [2, 1, 1]];
        let board = Board::from(raw);
        assert!(is_draw(&board, 9, 1));
    }

    #[test]
    fn test_full_board_with_line_is_not_draw() {
        // 1 1 1 / 2 2 1 / 1 2 2
        let raw: RawBoard = [[1, 1, 1], [2, 2, 1], [1, 2, 2]];
        let board = Board::from(raw);
        assert!(!is_draw(&board, 9, 1));
    }
}
