//! Persistence layer for players and matches.

mod error;
mod memory;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only
mod sqlite;

pub use error::{DbError, DbErrorKind};
pub use memory::MemoryRepository;
pub use repository::{MatchUpdate, Repository};
pub use sqlite::{DEFAULT_BUSY_TIMEOUT_MS, MIGRATIONS, SqliteRepository};
