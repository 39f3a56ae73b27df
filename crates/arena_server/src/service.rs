//! Match coordination business logic layer.

use std::collections::HashMap;
use std::sync::Arc;

use arena_core::rules::winning_line;
use arena_core::stats::{leaderboard_by_efficiency, leaderboard_by_wins};
use arena_core::{Match, MatchId, Player, PlayerId};
use derive_getters::Getters;
use derive_new::new;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{GameError, Repository};

/// Leaderboard row ranked by number of wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters, new)]
pub struct PlayerWins {
    player_id: PlayerId,
    username: String,
    win_count: u32,
}

/// Leaderboard row ranked by average moves per win.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, new)]
pub struct PlayerEfficiency {
    player_id: PlayerId,
    username: String,
    efficiency: f64,
}

/// Service layer for players, matches and leaderboards.
///
/// Wraps a [`Repository`] handle passed in at construction. Every mutation of
/// an existing match goes through [`Repository::update_match`], so rule
/// checks always run against freshly loaded state.
#[derive(Debug, Clone)]
pub struct MatchService {
    repository: Arc<dyn Repository>,
}

impl MatchService {
    /// Creates a service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        info!("Creating MatchService");
        Self { repository }
    }

    /// Registers a player under a unique, non-blank username.
    ///
    /// # Errors
    ///
    /// `Validation` if the username is blank or already registered.
    #[instrument(skip(self))]
    pub fn create_player(&self, username: &str) -> Result<Player, GameError> {
        let username = username.trim();
        if username.is_empty() {
            warn!("Rejected blank username");
            return Err(GameError::Validation(
                "Username must not be empty".to_string(),
            ));
        }

        if self.repository.get_player_by_username(username)?.is_some() {
            warn!(username, "Username already registered");
            return Err(GameError::username_taken());
        }

        self.repository.create_player(username)
    }

    /// Lists players ordered by id.
    #[instrument(skip(self))]
    pub fn list_players(&self, offset: i64, limit: i64) -> Result<Vec<Player>, GameError> {
        debug!(offset, limit, "Listing players");
        self.repository.list_players(offset, limit)
    }

    /// Looks up a player.
    ///
    /// # Errors
    ///
    /// `NotFound` if no player has this id.
    #[instrument(skip(self))]
    pub fn get_player(&self, id: PlayerId) -> Result<Player, GameError> {
        self.repository
            .get_player(id)?
            .ok_or_else(|| GameError::player_not_found(id))
    }

    /// Opens a pending match for `player1_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the player does not exist.
    #[instrument(skip(self))]
    pub fn create_match(&self, player1_id: PlayerId) -> Result<Match, GameError> {
        self.get_player(player1_id)?;
        self.repository.create_match(player1_id)
    }

    /// Reads the committed state of a match.
    ///
    /// # Errors
    ///
    /// `NotFound` if no match has this id.
    #[instrument(skip(self))]
    pub fn get_match(&self, id: MatchId) -> Result<Match, GameError> {
        self.repository
            .get_match(id)?
            .ok_or_else(|| GameError::match_not_found(id))
    }

    /// Lists matches ordered by id.
    #[instrument(skip(self))]
    pub fn list_matches(&self, offset: i64, limit: i64) -> Result<Vec<Match>, GameError> {
        debug!(offset, limit, "Listing matches");
        self.repository.list_matches(offset, limit)
    }

    /// Seats `player2_id` in a pending match and starts it.
    ///
    /// # Errors
    ///
    /// `NotFound` if the match or player is missing, `Conflict` if the player
    /// created the match or the match already has two players.
    #[instrument(skip(self))]
    pub fn join_match(&self, match_id: MatchId, player2_id: PlayerId) -> Result<Match, GameError> {
        self.get_player(player2_id)?;

        let joined = self.repository.update_match(match_id, &|current| {
            current.join(player2_id).map_err(GameError::from)
        });

        match &joined {
            Ok(game) => info!(
                match_id,
                player2_id,
                first_turn = ?game.current_turn_player_id(),
                "Match joined"
            ),
            Err(e) => warn!(match_id, player2_id, error = %e, "Join rejected"),
        }
        joined
    }

    /// Places `player_id`'s mark at (`row`, `col`).
    ///
    /// # Errors
    ///
    /// `NotFound` if the match is missing, `Conflict` if it is not in
    /// progress or the cell is out of range or taken, `Forbidden` if it is
    /// not this player's turn.
    #[instrument(skip(self))]
    pub fn make_move(
        &self,
        match_id: MatchId,
        player_id: PlayerId,
        row: i32,
        col: i32,
    ) -> Result<Match, GameError> {
        let moved = self.repository.update_match(match_id, &|current| {
            current
                .apply_move(player_id, row, col)
                .map_err(GameError::from)
        });

        match &moved {
            Ok(game) => {
                debug!(match_id, board = %game.board().display(), "Board after move");
                if let Some(outcome) = game.outcome() {
                    let line = outcome
                        .winner()
                        .and_then(|winner| winning_line(game.board(), winner));
                    info!(
                        match_id,
                        %outcome,
                        draw = outcome.is_draw(),
                        ?line,
                        moves = game.move_count(),
                        "Match finished"
                    );
                }
            }
            Err(e) => warn!(match_id, player_id, row, col, error = %e, "Move rejected"),
        }
        moved
    }

    /// Top players by number of wins.
    #[instrument(skip(self))]
    pub fn leaderboard_by_wins(&self) -> Result<Vec<PlayerWins>, GameError> {
        let finished = self.repository.list_finished_matches()?;
        let ranked = leaderboard_by_wins(&finished);
        let names = self.usernames(ranked.iter().map(|entry| *entry.player_id()))?;

        Ok(ranked
            .into_iter()
            .map(|entry| {
                PlayerWins::new(
                    *entry.player_id(),
                    names.get(entry.player_id()).cloned().unwrap_or_default(),
                    *entry.win_count(),
                )
            })
            .collect())
    }

    /// Top players by average moves per win, fewest first.
    #[instrument(skip(self))]
    pub fn leaderboard_by_efficiency(&self) -> Result<Vec<PlayerEfficiency>, GameError> {
        let finished = self.repository.list_finished_matches()?;
        let ranked = leaderboard_by_efficiency(&finished);
        let names = self.usernames(ranked.iter().map(|entry| *entry.player_id()))?;

        Ok(ranked
            .into_iter()
            .map(|entry| {
                PlayerEfficiency::new(
                    *entry.player_id(),
                    names.get(entry.player_id()).cloned().unwrap_or_default(),
                    *entry.efficiency(),
                )
            })
            .collect())
    }

    /// Resolves usernames for leaderboard entries.
    fn usernames(
        &self,
        ids: impl Iterator<Item = PlayerId>,
    ) -> Result<HashMap<PlayerId, String>, GameError> {
        let mut names = HashMap::new();
        for id in ids {
            match self.repository.get_player(id)? {
                Some(player) => {
                    names.insert(id, player.username().clone());
                }
                None => warn!(player_id = id, "Winner has no player record"),
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConflictReason, Entity, MemoryRepository};

    fn service() -> MatchService {
        MatchService::new(Arc::new(MemoryRepository::new()))
    }

    #[test]
    fn test_username_is_trimmed_and_unique() {
        let service = service();
        let alice = service.create_player("  alice ").unwrap();
        assert_eq!(alice.username(), "alice");

        let err = service.create_player("alice").unwrap_err();
        assert_eq!(err.to_string(), "Username already registered");
    }

    #[test]
    fn test_blank_username_rejected() {
        let err = service().create_player("   ").unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));
    }

    #[test]
    fn test_create_match_requires_known_player() {
        let err = service().create_match(42).unwrap_err();
        assert!(matches!(
            err,
            GameError::NotFound {
                entity: Entity::Player,
                id: 42
            }
        ));
    }

    #[test]
    fn test_join_requires_known_player() {
        let service = service();
        let alice = service.create_player("alice").unwrap();
        let game = service.create_match(*alice.id()).unwrap();

        let err = service.join_match(*game.id(), 77).unwrap_err();
        assert_eq!(err.to_string(), "Player with id 77 not found.");
        assert_eq!(service.get_match(*game.id()).unwrap(), game);
    }

    #[test]
    fn test_rejected_move_leaves_match_unchanged() {
        let service = service();
        let alice = service.create_player("alice").unwrap();
        let bob = service.create_player("bob").unwrap();
        let game = service.create_match(*alice.id()).unwrap();
        let game = service.join_match(*game.id(), *bob.id()).unwrap();
        let game = service.make_move(*game.id(), *alice.id(), 0, 0).unwrap();

        let err = service.make_move(*game.id(), *bob.id(), 0, 0).unwrap_err();
        assert!(matches!(err, GameError::Conflict(ConflictReason::CellOccupied)));
        assert_eq!(service.get_match(*game.id()).unwrap(), game);
    }

    #[test]
    fn test_missing_match() {
        let err = service().make_move(999, 1, 0, 0).unwrap_err();
        assert_eq!(err.to_string(), "Game with id 999 not found.");
    }

    #[test]
    fn test_empty_leaderboards() {
        let service = service();
        assert!(service.leaderboard_by_wins().unwrap().is_empty());
        assert!(service.leaderboard_by_efficiency().unwrap().is_empty());
    }
}
