//! Tic-tac-toe match server.
//!
//! Coordinates two-player matches over a REST API and persists them through a
//! [`Repository`].
//!
//! # Architecture
//!
//! - **Service**: [`MatchService`] validates requests and drives the rules in `arena_core`
//! - **Storage**: SQLite via diesel, or process memory for tests and demos
//! - **Locking**: [`MatchLocks`] serializes mutations of the same match
//! - **API**: axum router mapping [`GameError`] to HTTP status codes
//!
//! # Example
//!
//! ```
//! use arena_server::{MatchService, MemoryRepository};
//! use std::sync::Arc;
//!
//! let service = MatchService::new(Arc::new(MemoryRepository::new()));
//! let alice = service.create_player("alice").expect("fresh username");
//! let bob = service.create_player("bob").expect("fresh username");
//!
//! let game = service.create_match(*alice.id()).expect("player exists");
//! let game = service.join_match(*game.id(), *bob.id()).expect("open seat");
//! let game = service.make_move(*game.id(), *alice.id(), 1, 1).expect("legal move");
//! assert_eq!(*game.move_count(), 1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod config;
mod db;
mod error;
mod locks;
mod service;

// Crate-level exports - HTTP surface
pub use api::{AppState, ErrorBody, JoinParams, MoveRequest, NewPlayerRequest, NewMatchRequest, PageParams, router};

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig, StorageBackend};

// Crate-level exports - Persistence
pub use db::{
    DEFAULT_BUSY_TIMEOUT_MS, DbError, DbErrorKind, MIGRATIONS, MatchUpdate, MemoryRepository, Repository,
    SqliteRepository,
};

// Crate-level exports - Errors
pub use error::{Entity, GameError};

// Crate-level exports - Locking
pub use locks::MatchLocks;

// Crate-level exports - Service
pub use service::{MatchService, PlayerEfficiency, PlayerWins};

// Crate-level exports - Match types
pub use arena_core::{
    Board, ConflictReason, ForbiddenReason, Match, MatchId, MatchStatus, Outcome, Player,
    PlayerId,
};
