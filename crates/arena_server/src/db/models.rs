//! Diesel row types and their mapping to domain types.
//!
//! Rows stay inside the persistence layer; the rest of the crate sees only
//! [`Player`] and [`Match`].

use std::str::FromStr;

use arena_core::{Board, Match, MatchStatus, Player};
use chrono::NaiveDateTime;
use derive_new::new;
use diesel::prelude::*;
use tracing::{instrument, warn};

use crate::db::{DbError, DbErrorKind, schema};

/// Player row as selected from storage.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::players)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct PlayerRow {
    id: i32,
    username: String,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player::new(row.id, row.username)
    }
}

/// Insertable player.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::players)]
pub(crate) struct NewPlayerRow<'a> {
    username: &'a str,
}

/// Match row as selected from storage.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::matches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct MatchRow {
    id: i32,
    player1_id: i32,
    player2_id: Option<i32>,
    winner_id: Option<i32>,
    current_turn_player_id: Option<i32>,
    board: String,
    status: String,
    move_count: i32,
}

#[track_caller]
fn corrupt(message: String) -> DbError {
    DbError::new(DbErrorKind::Corrupt, message)
}

impl TryFrom<MatchRow> for Match {
    type Error = DbError;

    #[instrument(skip(row), fields(match_id = row.id))]
    fn try_from(row: MatchRow) -> Result<Self, Self::Error> {
        let board: Board = serde_json::from_str(&row.board)?;
        let status = MatchStatus::from_str(&row.status)
            .map_err(|_| corrupt(format!("Invalid match status: '{}'", row.status)))?;
        let move_count = u8::try_from(row.move_count)
            .map_err(|_| corrupt(format!("Invalid move count: {}", row.move_count)))?;

        let game = Match::new(
            row.id,
            row.player1_id,
            row.player2_id,
            row.winner_id,
            row.current_turn_player_id,
            board,
            status,
            move_count,
        );

        let violations = game.violations();
        if !violations.is_empty() {
            warn!(?violations, "Stored match violates invariants");
            return Err(corrupt(format!(
                "Match {} violates: {}",
                row.id,
                violations.join(", ")
            )));
        }
        Ok(game)
    }
}

/// Insertable match, built from a fresh pending state.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::matches)]
pub(crate) struct NewMatchRow {
    player1_id: i32,
    board: String,
    status: String,
    move_count: i32,
}

impl NewMatchRow {
    /// Encodes a pending match; its id is assigned by the database.
    pub(crate) fn from_pending(game: &Match) -> Result<Self, DbError> {
        Ok(Self {
            player1_id: *game.player1_id(),
            board: serde_json::to_string(game.board())?,
            status: game.status().as_ref().to_string(),
            move_count: i32::from(*game.move_count()),
        })
    }
}

/// Full rewrite of a match's mutable columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::matches)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct MatchChanges {
    player2_id: Option<i32>,
    winner_id: Option<i32>,
    current_turn_player_id: Option<i32>,
    board: String,
    status: String,
    move_count: i32,
    updated_at: NaiveDateTime,
}

impl MatchChanges {
    /// Encodes every mutable column of `game`.
    pub(crate) fn from_match(game: &Match) -> Result<Self, DbError> {
        Ok(Self {
            player2_id: *game.player2_id(),
            winner_id: *game.winner_id(),
            current_turn_player_id: *game.current_turn_player_id(),
            board: serde_json::to_string(game.board())?,
            status: game.status().as_ref().to_string(),
            move_count: i32::from(*game.move_count()),
            updated_at: chrono::Utc::now().naive_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, board: &str, move_count: i32) -> MatchRow {
        MatchRow {
            id: 1,
            player1_id: 1,
            player2_id: Some(2),
            winner_id: None,
            current_turn_player_id: Some(2),
            board: board.to_string(),
            status: status.to_string(),
            move_count,
        }
    }

    #[test]
    fn test_valid_row_decodes() {
        let game = Match::try_from(row("in_progress", "[[1,0,0],[0,0,0],[0,0,0]]", 1)).unwrap();
        assert_eq!(*game.status(), MatchStatus::InProgress);
        assert_eq!(*game.move_count(), 1);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = Match::try_from(row("paused", "[[0,0,0],[0,0,0],[0,0,0]]", 0)).unwrap_err();
        assert_eq!(err.kind, DbErrorKind::Corrupt);
        assert!(err.message.contains("Invalid match status"));
    }

    #[test]
    fn test_malformed_board_rejected() {
        assert!(Match::try_from(row("in_progress", "[[1,0]]", 1)).is_err());
    }

    #[test]
    fn test_row_with_decided_board_rejected() {
        let err = Match::try_from(row("in_progress", "[[1,1,1],[2,2,0],[0,0,0]]", 5)).unwrap_err();
        assert_eq!(err.kind, DbErrorKind::Corrupt);

        let err = Match::try_from(row("in_progress", "[[1,2,1],[1,2,2],[2,1,1]]", 9)).unwrap_err();
        assert_eq!(err.kind, DbErrorKind::Corrupt);
    }

    #[test]
    fn test_inconsistent_row_rejected() {
        let err = Match::try_from(row("in_progress", "[[1,0,0],[0,0,0],[0,0,0]]", 4)).unwrap_err();
        assert_eq!(err.kind, DbErrorKind::Corrupt);
        assert!(err.message.contains("Move count equals occupied squares"));
    }
}
