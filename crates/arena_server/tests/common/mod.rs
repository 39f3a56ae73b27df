//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use arena_server::{Match, MatchService, MemoryRepository, Player, Repository, SqliteRepository};
use tempfile::NamedTempFile;

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready repository.
pub fn setup_test_db() -> (NamedTempFile, SqliteRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let repo = SqliteRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    (db_file, repo)
}

/// One service per storage backend. The temp file must outlive the services.
pub fn services() -> (NamedTempFile, Vec<(&'static str, MatchService)>) {
    let (db_file, sqlite) = setup_test_db();
    let memory: Arc<dyn Repository> = Arc::new(MemoryRepository::new());
    let sqlite: Arc<dyn Repository> = Arc::new(sqlite);
    (
        db_file,
        vec![
            ("memory", MatchService::new(memory)),
            ("sqlite", MatchService::new(sqlite)),
        ],
    )
}

/// Two registered players and a match between them, first player to move.
pub fn seated_match(service: &MatchService) -> (Player, Player, Match) {
    let alice = service.create_player("alice").expect("Create alice failed");
    let bob = service.create_player("bob").expect("Create bob failed");
    let game = service.create_match(*alice.id()).expect("Create match failed");
    let game = service
        .join_match(*game.id(), *bob.id())
        .expect("Join failed");
    (alice, bob, game)
}

/// Plays `moves` in order, alternating from the first player.
pub fn play(service: &MatchService, game: &Match, players: [&Player; 2], moves: &[(i32, i32)]) -> Match {
    let mut current = game.clone();
    for (turn, (row, col)) in moves.iter().enumerate() {
        let player = players[turn % 2];
        current = service
            .make_move(*game.id(), *player.id(), *row, *col)
            .unwrap_or_else(|e| panic!("Move {} at ({}, {}) failed: {}", turn + 1, row, col, e));
    }
    current
}
