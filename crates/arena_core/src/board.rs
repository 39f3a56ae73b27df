//! Board representation for a 3x3 match.

use crate::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of rows (and columns) on the board.
pub const BOARD_SIZE: usize = 3;

/// Number of moves that fill the board.
pub const MAX_MOVES: u8 = 9;

/// Returns true if `(row, col)` lies on the board.
#[instrument]
pub fn is_valid_cell(row: i32, col: i32) -> bool {
    let size = BOARD_SIZE as i32;
    (0..size).contains(&row) && (0..size).contains(&col)
}

/// A validated board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    row: usize,
    col: usize,
}

impl Cell {
    /// Creates a cell from raw coordinates, or `None` if they are off the board.
    #[instrument]
    pub fn from_coords(row: i32, col: i32) -> Option<Self> {
        if !is_valid_cell(row, col) {
            return None;
        }
        Some(Self {
            row: usize::try_from(row).ok()?,
            col: usize::try_from(col).ok()?,
        })
    }

    /// Row index (0-2).
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column index (0-2).
    pub fn col(&self) -> usize {
        self.col
    }
}

/// A square on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square owned by a player.
    Occupied(PlayerId),
}

impl Square {
    /// Stored representation: `0` for empty, otherwise the owner's id.
    pub fn to_raw(self) -> PlayerId {
        match self {
            Square::Empty => 0,
            Square::Occupied(player) => player,
        }
    }

    /// Parses the stored representation.
    pub fn from_raw(raw: PlayerId) -> Self {
        if raw == 0 {
            Square::Empty
        } else {
            Square::Occupied(raw)
        }
    }
}

/// Raw board layout used on the wire and in storage.
pub type RawBoard = [[PlayerId; BOARD_SIZE]; BOARD_SIZE];

/// 3x3 board. A value type: moves produce a new board.
///
/// Serialized as three rows of three integers, `0` meaning empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RawBoard", from = "RawBoard")]
pub struct Board {
    squares: [[Square; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            squares: [[Square::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Returns the square at `cell`.
    pub fn get(&self, cell: Cell) -> Square {
        self.squares[cell.row][cell.col]
    }

    /// Returns true if the square at `cell` is owned by someone.
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.get(cell) != Square::Empty
    }

    /// Returns a new board with `cell` owned by `player`.
    ///
    /// The caller validates legality first; this only writes the square.
    #[instrument(skip(self))]
    pub fn with_move(&self, cell: Cell, player: PlayerId) -> Self {
        let mut next = *self;
        next.squares[cell.row][cell.col] = Square::Occupied(player);
        next
    }

    /// Number of occupied squares.
    pub fn occupied_count(&self) -> usize {
        self.squares
            .iter()
            .flatten()
            .filter(|square| **square != Square::Empty)
            .count()
    }

    /// Rows of squares.
    pub fn rows(&self) -> &[[Square; BOARD_SIZE]; BOARD_SIZE] {
        &self.squares
    }

    /// Formats the board as a human-readable grid.
    pub fn display(&self) -> String {
        self.squares
            .iter()
            .map(|row| {
                row.iter()
                    .map(|square| match square {
                        Square::Empty => ".".to_string(),
                        Square::Occupied(player) => player.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Board> for RawBoard {
    fn from(board: Board) -> Self {
        board.squares.map(|row| row.map(Square::to_raw))
    }
}

impl From<RawBoard> for Board {
    fn from(raw: RawBoard) -> Self {
        Self {
            squares: raw.map(|row| row.map(Square::from_raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_cell_bounds() {
        assert!(is_valid_cell(0, 0));
        assert!(is_valid_cell(2, 2));
        assert!(!is_valid_cell(3, 0));
        assert!(!is_valid_cell(0, 3));
        assert!(!is_valid_cell(-1, 1));
        assert!(Cell::from_coords(1, -1).is_none());
    }

    #[test]
    fn test_with_move_leaves_original_untouched() {
        let board = Board::new();
        let cell = Cell::from_coords(1, 2).unwrap();
        let next = board.with_move(cell, 7);

        assert!(!board.is_occupied(cell));
        assert_eq!(next.get(cell), Square::Occupied(7));
        assert_eq!(next.occupied_count(), 1);
    }

    #[test]
    fn test_serializes_as_nested_rows() {
        let board = Board::new().with_move(Cell::from_coords(0, 1).unwrap(), 4);
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, "[[0,4,0],[0,0,0],[0,0,0]]");

        let parsed: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, board);
    }
}
