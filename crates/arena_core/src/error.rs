//! Rule violations reported by the match state machine.

use derive_more::Display;
use serde::Serialize;

/// Why a request conflicts with the current match state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    /// Second seat is already taken.
    #[display("Game is already full.")]
    GameFull,
    /// Creator tried to join their own match.
    #[display("Player cannot join their own game.")]
    PlayerAlreadyInGame,
    /// Match is pending or finished.
    #[display("Game is not in progress.")]
    NotInProgress,
    /// Coordinates are off the board.
    #[display("Invalid cell coordinates.")]
    InvalidCell,
    /// Target square is already owned.
    #[display("Cell is already occupied.")]
    CellOccupied,
}

impl std::error::Error for ConflictReason {}

/// Why a player may not perform a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    /// Move submitted out of turn.
    #[display("It's not your turn.")]
    NotYourTurn,
}

impl std::error::Error for ForbiddenReason {}

/// Error returned by [`Match::join`](crate::Match::join) and
/// [`Match::apply_move`](crate::Match::apply_move).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MatchError {
    /// State-incompatible request.
    #[display("{}", _0)]
    Conflict(ConflictReason),
    /// Turn violation.
    #[display("{}", _0)]
    Forbidden(ForbiddenReason),
}

impl std::error::Error for MatchError {}

impl From<ConflictReason> for MatchError {
    fn from(reason: ConflictReason) -> Self {
        MatchError::Conflict(reason)
    }
}

impl From<ForbiddenReason> for MatchError {
    fn from(reason: ForbiddenReason) -> Self {
        MatchError::Forbidden(reason)
    }
}
