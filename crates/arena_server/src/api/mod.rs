//! REST surface for players, matches and leaderboards.

mod error;
mod extract;
mod handlers;

pub use error::ErrorBody;
pub use handlers::{JoinParams, MoveRequest, NewMatchRequest, NewPlayerRequest, PageParams};

use crate::MatchService;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tracing::{info, instrument};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Match coordination service.
    pub service: MatchService,
}

impl AppState {
    /// Wraps `service` for sharing across handlers.
    pub fn new(service: MatchService) -> Arc<Self> {
        Arc::new(Self { service })
    }
}

/// Creates the HTTP router with all routes.
#[instrument(skip(state))]
pub fn router(state: Arc<AppState>) -> Router {
    info!("Building HTTP router");
    Router::new()
        // Player routes
        .route(
            "/players",
            post(handlers::create_player).get(handlers::list_players),
        )
        // Match routes
        .route(
            "/games",
            post(handlers::create_match).get(handlers::list_matches),
        )
        .route("/games/{id}", get(handlers::get_match))
        .route("/games/{id}/join", post(handlers::join_match))
        .route("/games/{id}/move", post(handlers::make_move))
        // Leaderboard routes
        .route("/leaderboard", get(handlers::leaderboard_by_wins))
        .route(
            "/leaderboard/efficiency",
            get(handlers::leaderboard_by_efficiency),
        )
        .with_state(state)
}
