//! Storage error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Stage of a storage call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// Opening or configuring a connection.
    #[display("connection")]
    Connection,
    /// Running a query or transaction.
    #[display("query")]
    Query,
    /// Applying schema migrations.
    #[display("migration")]
    Migration,
    /// Encoding or decoding a stored board.
    #[display("encoding")]
    Encoding,
    /// A stored record that no valid match could produce.
    #[display("corrupt record")]
    Corrupt,
}

/// Storage failure with the location that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("Database {} error: {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failed stage.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates an error of `kind` tagged with the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for a [`DbErrorKind::Query`] failure.
    #[track_caller]
    pub fn query(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::Query, message)
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::query(err.to_string())
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(DbErrorKind::Connection, err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(DbErrorKind::Encoding, err.to_string())
    }
}
