//! Pure tic-tac-toe match logic.
//!
//! This crate has no I/O. It owns the rules a match server enforces:
//!
//! - **Board**: 3x3 grid of squares owned by player ids, win and draw detection
//! - **Match**: lifecycle state machine (`pending` → `in_progress` → `finished`)
//! - **Stats**: leaderboards derived from finished matches
//!
//! Every transition is value-in, value-out: [`Match::join`] and
//! [`Match::apply_move`] borrow the current state and return the next one,
//! leaving persistence to the caller.
//!
//! # Example
//!
//! ```
//! use arena_core::{Match, MatchStatus};
//!
//! let pending = Match::pending(1, 10);
//! let started = pending.join(20).expect("second player joins");
//! assert_eq!(*started.status(), MatchStatus::InProgress);
//!
//! let after = started.apply_move(10, 1, 1).expect("legal move");
//! assert_eq!(*after.move_count(), 1);
//! assert_eq!(*after.current_turn_player_id(), Some(20));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod error;
mod game;
pub mod invariants;
mod player;
pub mod rules;
pub mod stats;

pub use board::{BOARD_SIZE, Board, Cell, MAX_MOVES, RawBoard, Square, is_valid_cell};
pub use error::{ConflictReason, ForbiddenReason, MatchError};
pub use game::{Match, MatchStatus, Outcome};
pub use player::Player;
pub use stats::{Efficiency, LEADERBOARD_SIZE, WinCount};

/// Identifier of a registered player.
pub type PlayerId = i32;

/// Identifier of a match.
pub type MatchId = i32;
