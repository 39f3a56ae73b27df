//! Error taxonomy surfaced by match service operations.

use crate::db::DbError;
use arena_core::{ConflictReason, ForbiddenReason, MatchError};
use derive_more::Display;

/// Kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Entity {
    /// A match (called "game" on the wire).
    #[display("Game")]
    Match,
    /// A registered player.
    #[display("Player")]
    Player,
}

/// Error returned by repository and service operations.
///
/// Every variant except `Storage` and `Internal` is an expected, caller-recoverable
/// outcome. None of them leaves a match partially mutated.
#[derive(Debug, Clone, Display)]
pub enum GameError {
    /// Referenced match or player does not exist.
    #[display("{} with id {} not found.", entity, id)]
    NotFound {
        /// What was looked up.
        entity: Entity,
        /// The missing id.
        id: i32,
    },
    /// Request incompatible with the current match state.
    #[display("{}", _0)]
    Conflict(ConflictReason),
    /// Turn violation.
    #[display("{}", _0)]
    Forbidden(ForbiddenReason),
    /// Malformed or rejected input.
    #[display("{}", _0)]
    Validation(String),
    /// Storage failure.
    #[display("{}", _0)]
    Storage(DbError),
    /// Failure outside storage and rules, such as a lost worker task.
    #[display("{}", _0)]
    Internal(String),
}

impl GameError {
    /// Match lookup failure.
    pub fn match_not_found(id: i32) -> Self {
        GameError::NotFound {
            entity: Entity::Match,
            id,
        }
    }

    /// Player lookup failure.
    pub fn player_not_found(id: i32) -> Self {
        GameError::NotFound {
            entity: Entity::Player,
            id,
        }
    }

    /// Username uniqueness failure.
    pub fn username_taken() -> Self {
        GameError::Validation("Username already registered".to_string())
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MatchError> for GameError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::Conflict(reason) => GameError::Conflict(reason),
            MatchError::Forbidden(reason) => GameError::Forbidden(reason),
        }
    }
}

impl From<ConflictReason> for GameError {
    fn from(reason: ConflictReason) -> Self {
        GameError::Conflict(reason)
    }
}

impl From<ForbiddenReason> for GameError {
    fn from(reason: ForbiddenReason) -> Self {
        GameError::Forbidden(reason)
    }
}

impl From<DbError> for GameError {
    fn from(err: DbError) -> Self {
        GameError::Storage(err)
    }
}

impl From<diesel::result::Error> for GameError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        GameError::Storage(DbError::from(err))
    }
}
