//! Win and draw rules.
//!
//! Pure functions over a [`Board`](crate::Board), kept apart from board
//! storage so the match state machine can compose them.

pub mod draw;
pub mod win;

pub use draw::is_draw;
pub use win::{LINES, check_win, winning_line};
