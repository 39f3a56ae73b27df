//! In-memory repository.

use crate::db::{MatchUpdate, Repository};
use crate::{GameError, MatchLocks};
use arena_core::{Match, MatchId, MatchStatus, Player, PlayerId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct Tables {
    players: BTreeMap<PlayerId, Player>,
    matches: BTreeMap<MatchId, Match>,
    next_player_id: PlayerId,
    next_match_id: MatchId,
}

/// Repository keeping every record in process memory.
///
/// Cloning shares the same tables. Match updates serialize on the per-match
/// lock; the table mutex is held only for single reads and writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<Mutex<Tables>>,
    locks: MatchLocks,
}

impl MemoryRepository {
    /// Creates an empty repository.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory repository");
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Every write replaces whole records, so a poisoned guard is consistent.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn page<T>(records: impl Iterator<Item = T>, offset: i64, limit: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    records.skip(offset).take(limit).collect()
}

impl Repository for MemoryRepository {
    #[instrument(skip(self))]
    fn get_player(&self, id: PlayerId) -> Result<Option<Player>, GameError> {
        Ok(self.tables().players.get(&id).cloned())
    }

    #[instrument(skip(self))]
    fn get_player_by_username(&self, username: &str) -> Result<Option<Player>, GameError> {
        Ok(self
            .tables()
            .players
            .values()
            .find(|player| player.username() == username)
            .cloned())
    }

    #[instrument(skip(self))]
    fn list_players(&self, offset: i64, limit: i64) -> Result<Vec<Player>, GameError> {
        let tables = self.tables();
        let players = page(tables.players.values().cloned(), offset, limit);
        Ok(players)
    }

    #[instrument(skip(self))]
    fn create_player(&self, username: &str) -> Result<Player, GameError> {
        let mut tables = self.tables();
        if tables.players.values().any(|p| p.username() == username) {
            warn!(username, "Username already registered");
            return Err(GameError::username_taken());
        }

        tables.next_player_id += 1;
        let player = Player::new(tables.next_player_id, username.to_string());
        tables.players.insert(*player.id(), player.clone());

        info!(player_id = player.id(), username, "Player created");
        Ok(player)
    }

    #[instrument(skip(self))]
    fn create_match(&self, player1_id: PlayerId) -> Result<Match, GameError> {
        let mut tables = self.tables();
        tables.next_match_id += 1;
        let game = Match::pending(tables.next_match_id, player1_id);
        tables.matches.insert(*game.id(), game.clone());

        info!(match_id = game.id(), player1_id, "Match created");
        Ok(game)
    }

    #[instrument(skip(self))]
    fn get_match(&self, id: MatchId) -> Result<Option<Match>, GameError> {
        Ok(self.tables().matches.get(&id).cloned())
    }

    #[instrument(skip(self))]
    fn list_matches(&self, offset: i64, limit: i64) -> Result<Vec<Match>, GameError> {
        let tables = self.tables();
        let matches = page(tables.matches.values().cloned(), offset, limit);
        Ok(matches)
    }

    #[instrument(skip(self))]
    fn list_finished_matches(&self) -> Result<Vec<Match>, GameError> {
        let finished: Vec<Match> = self
            .tables()
            .matches
            .values()
            .filter(|game| *game.status() == MatchStatus::Finished)
            .cloned()
            .collect();
        debug!(count = finished.len(), "Finished matches loaded");
        Ok(finished)
    }

    #[instrument(skip(self, update))]
    fn update_match(&self, id: MatchId, update: MatchUpdate<'_>) -> Result<Match, GameError> {
        self.locks.with_exclusive(id, || {
            let current = self
                .get_match(id)?
                .ok_or_else(|| GameError::match_not_found(id))?;
            let next = update(&current)?;
            self.tables().matches.insert(id, next.clone());
            debug!(match_id = id, status = %next.status(), "Match stored");
            Ok(next)
        })
    }
}
