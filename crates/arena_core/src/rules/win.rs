//! Win detection.

use crate::{BOARD_SIZE, Board, Cell, PlayerId, Square};
use tracing::instrument;

/// The eight winning lines as `(row, col)` triples.
pub const LINES: [[(usize, usize); BOARD_SIZE]; 8] = [
    // Rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // Columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // Diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// Returns true if `player` owns every square of any row, column or diagonal.
#[instrument(skip(board))]
pub fn check_win(board: &Board, player: PlayerId) -> bool {
    let rows = board.rows();
    LINES.iter().any(|line| {
        line.iter()
            .all(|&(row, col)| rows[row][col] == Square::Occupied(player))
    })
}

/// Cells of the first line completed by `player`, if any.
pub fn winning_line(board: &Board, player: PlayerId) -> Option<[Cell; BOARD_SIZE]> {
    let rows = board.rows();
    LINES
        .iter()
        .find(|line| {
            line.iter()
                .all(|&(row, col)| rows[row][col] == Square::Occupied(player))
        })
        .and_then(|line| {
            let [a, b, c] = line.map(|(row, col)| Cell::from_coords(row as i32, col as i32));
            Some([a?, b?, c?])
        })
}
