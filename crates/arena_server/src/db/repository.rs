//! Storage contract consumed by the match service.

use crate::GameError;
use arena_core::{Match, MatchId, Player, PlayerId};

/// Transition applied to a freshly loaded match under exclusive access.
///
/// Receives the authoritative current state and returns the next state, or
/// an error that aborts the update without writing anything.
pub type MatchUpdate<'a> = &'a dyn Fn(&Match) -> Result<Match, GameError>;

/// Durable storage of players and matches.
///
/// Implementations own durability, username uniqueness and the per-match
/// locking primitive behind [`Repository::update_match`].
pub trait Repository: Send + Sync + std::fmt::Debug {
    /// Looks up a player by id.
    fn get_player(&self, id: PlayerId) -> Result<Option<Player>, GameError>;

    /// Looks up a player by username.
    fn get_player_by_username(&self, username: &str) -> Result<Option<Player>, GameError>;

    /// Lists players ordered by id.
    fn list_players(&self, offset: i64, limit: i64) -> Result<Vec<Player>, GameError>;

    /// Registers a player.
    ///
    /// # Errors
    ///
    /// `Validation` if the username is taken.
    fn create_player(&self, username: &str) -> Result<Player, GameError>;

    /// Stores a new pending match created by `player1_id`.
    fn create_match(&self, player1_id: PlayerId) -> Result<Match, GameError>;

    /// Reads the committed state of a match without locking.
    fn get_match(&self, id: MatchId) -> Result<Option<Match>, GameError>;

    /// Lists matches ordered by id.
    fn list_matches(&self, offset: i64, limit: i64) -> Result<Vec<Match>, GameError>;

    /// Every finished match, won or drawn.
    fn list_finished_matches(&self) -> Result<Vec<Match>, GameError>;

    /// Atomic load-under-lock, transition, store.
    ///
    /// Acquires the exclusive lock for `id`, reloads the match, applies
    /// `update` and persists its result before releasing the lock. If the
    /// match is missing or `update` fails nothing is written and the error
    /// is returned. Readers never observe a partially applied update.
    fn update_match(&self, id: MatchId, update: MatchUpdate<'_>) -> Result<Match, GameError>;
}
