//! SQLite repository backed by diesel.

use arena_core::{Match, MatchId, MatchStatus, Player, PlayerId};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::models::{MatchChanges, MatchRow, NewMatchRow, NewPlayerRow, PlayerRow};
use crate::db::{DbError, DbErrorKind, MatchUpdate, Repository, schema};
use crate::{GameError, MatchLocks};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Default time a connection waits on a locked database file.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Repository storing players and matches in a SQLite file.
///
/// A connection is opened per call. Match updates hold the per-match lock and
/// run inside a `BEGIN IMMEDIATE` transaction, so the load, transition and
/// store commit together or not at all.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    database_url: String,
    busy_timeout_ms: u64,
    locks: MatchLocks,
}

impl SqliteRepository {
    /// Creates a repository for the database file at `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(database_url), fields(database_url = %database_url))]
    pub fn new(database_url: String) -> Result<Self, DbError> {
        if database_url.trim().is_empty() {
            return Err(DbError::new(
                DbErrorKind::Connection,
                "Database url must not be empty",
            ));
        }
        info!(path = %database_url, "Creating SqliteRepository");
        Ok(Self {
            database_url,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            locks: MatchLocks::new(),
        })
    }

    /// Sets how long a connection waits on a locked database file.
    pub fn with_busy_timeout(mut self, busy_timeout_ms: u64) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }

    /// Applies pending schema migrations, returning how many ran.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a connection cannot be opened or a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        conn.batch_execute("PRAGMA journal_mode = WAL;")?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Migration, e.to_string()))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(applied.len())
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.database_url, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.database_url).map_err(|e| {
            DbError::new(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.database_url, e),
            )
        })?;
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON;",
            self.busy_timeout_ms
        ))?;
        Ok(conn)
    }

    /// Reads a match inside the caller's write transaction.
    #[instrument(skip(conn))]
    fn load_match_for_update(
        conn: &mut SqliteConnection,
        id: MatchId,
    ) -> Result<Option<Match>, GameError> {
        let row = schema::matches::table
            .find(id)
            .select(MatchRow::as_select())
            .first(conn)
            .optional()?;
        Ok(row.map(Match::try_from).transpose()?)
    }

    /// Writes every mutable column of `game` inside the caller's transaction.
    #[instrument(skip(conn, game), fields(match_id = game.id()))]
    fn save_match(conn: &mut SqliteConnection, game: &Match) -> Result<(), GameError> {
        let changes = MatchChanges::from_match(game)?;
        let updated = diesel::update(schema::matches::table.find(*game.id()))
            .set(&changes)
            .execute(conn)?;
        if updated != 1 {
            return Err(DbError::query(format!(
                "Expected to update one match row, updated {}",
                updated
            ))
            .into());
        }
        Ok(())
    }
}

impl Repository for SqliteRepository {
    #[instrument(skip(self))]
    fn get_player(&self, id: PlayerId) -> Result<Option<Player>, GameError> {
        let mut conn = self.connection()?;
        let player = schema::players::table
            .find(id)
            .select(PlayerRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(player.map(Player::from))
    }

    #[instrument(skip(self))]
    fn get_player_by_username(&self, username: &str) -> Result<Option<Player>, GameError> {
        debug!(username, "Looking up player by username");
        let mut conn = self.connection()?;
        let player = schema::players::table
            .filter(schema::players::username.eq(username))
            .select(PlayerRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(player.map(Player::from))
    }

    #[instrument(skip(self))]
    fn list_players(&self, offset: i64, limit: i64) -> Result<Vec<Player>, GameError> {
        let mut conn = self.connection()?;
        let players = schema::players::table
            .order(schema::players::id.asc())
            .offset(offset)
            .limit(limit)
            .select(PlayerRow::as_select())
            .load(&mut conn)?;
        debug!(count = players.len(), "Players loaded");
        Ok(players.into_iter().map(Player::from).collect())
    }

    #[instrument(skip(self))]
    fn create_player(&self, username: &str) -> Result<Player, GameError> {
        let mut conn = self.connection()?;
        let inserted = diesel::insert_into(schema::players::table)
            .values(&NewPlayerRow::new(username))
            .returning(PlayerRow::as_returning())
            .get_result(&mut conn);

        match inserted {
            Ok(row) => {
                let player = Player::from(row);
                info!(player_id = player.id(), username, "Player created");
                Ok(player)
            }
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                warn!(username, "Username already registered");
                Err(GameError::username_taken())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    fn create_match(&self, player1_id: PlayerId) -> Result<Match, GameError> {
        let mut conn = self.connection()?;
        let new_match = NewMatchRow::from_pending(&Match::pending(0, player1_id))?;
        let row = diesel::insert_into(schema::matches::table)
            .values(&new_match)
            .returning(MatchRow::as_returning())
            .get_result(&mut conn)?;
        let game = Match::try_from(row)?;
        info!(match_id = game.id(), player1_id, "Match created");
        Ok(game)
    }

    #[instrument(skip(self))]
    fn get_match(&self, id: MatchId) -> Result<Option<Match>, GameError> {
        let mut conn = self.connection()?;
        let row = schema::matches::table
            .find(id)
            .select(MatchRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Match::try_from).transpose()?)
    }

    #[instrument(skip(self))]
    fn list_matches(&self, offset: i64, limit: i64) -> Result<Vec<Match>, GameError> {
        let mut conn = self.connection()?;
        let rows = schema::matches::table
            .order(schema::matches::id.asc())
            .offset(offset)
            .limit(limit)
            .select(MatchRow::as_select())
            .load(&mut conn)?;
        debug!(count = rows.len(), "Matches loaded");
        Ok(rows
            .into_iter()
            .map(Match::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    #[instrument(skip(self))]
    fn list_finished_matches(&self) -> Result<Vec<Match>, GameError> {
        let mut conn = self.connection()?;
        let rows = schema::matches::table
            .filter(schema::matches::status.eq(MatchStatus::Finished.as_ref()))
            .order(schema::matches::id.asc())
            .select(MatchRow::as_select())
            .load(&mut conn)?;
        debug!(count = rows.len(), "Finished matches loaded");
        Ok(rows
            .into_iter()
            .map(Match::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    #[instrument(skip(self, update))]
    fn update_match(&self, id: MatchId, update: MatchUpdate<'_>) -> Result<Match, GameError> {
        self.locks.with_exclusive(id, || {
            let mut conn = self.connection()?;
            conn.immediate_transaction::<_, GameError, _>(|conn| {
                let current = Self::load_match_for_update(conn, id)?
                    .ok_or_else(|| GameError::match_not_found(id))?;
                let next = update(&current)?;
                Self::save_match(conn, &next)?;
                debug!(match_id = id, status = %next.status(), "Match stored");
                Ok(next)
            })
        })
    }
}
