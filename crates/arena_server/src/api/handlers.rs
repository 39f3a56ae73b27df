//! Route handlers.
//!
//! Service calls touch SQLite and may wait on a match lock, so each one runs
//! on the blocking thread pool.

use std::sync::Arc;

use arena_core::{Match, MatchId, Player, PlayerId};
use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::AppState;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{GameError, MatchService, PlayerEfficiency, PlayerWins};

const DEFAULT_LIMIT: i64 = 100;

/// Body of `POST /players`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlayerRequest {
    /// Requested username.
    pub username: String,
}

/// Body of `POST /games`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMatchRequest {
    /// Player opening the match.
    pub player1_id: PlayerId,
}

/// Query of `POST /games/{id}/join`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinParams {
    /// Player taking the second seat.
    pub player_id: PlayerId,
}

/// Body of `POST /games/{id}/move`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Player making the move.
    pub player_id: PlayerId,
    /// Zero-based row.
    pub row: i32,
    /// Zero-based column.
    pub col: i32,
}

/// Pagination query for list routes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageParams {
    /// Records to skip.
    #[serde(default)]
    pub skip: i64,
    /// Maximum records returned.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl PageParams {
    fn validated(self) -> Result<(i64, i64), GameError> {
        if self.skip < 0 || self.limit < 0 {
            return Err(GameError::Validation(
                "skip and limit must not be negative".to_string(),
            ));
        }
        Ok((self.skip, self.limit))
    }
}

/// Runs a service call on the blocking pool.
async fn run<T, F>(state: &AppState, call: F) -> Result<T, GameError>
where
    T: Send + 'static,
    F: FnOnce(&MatchService) -> Result<T, GameError> + Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || call(&service))
        .await
        .map_err(|e| GameError::Internal(format!("Worker task failed: {}", e)))?
}

/// Registers a player.
#[instrument(skip(state))]
pub(super) async fn create_player(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<NewPlayerRequest>,
) -> Result<Json<Player>, GameError> {
    let player = run(&state, move |service| service.create_player(&request.username)).await?;
    Ok(Json(player))
}

/// Lists players.
#[instrument(skip(state))]
pub(super) async fn list_players(
    State(state): State<Arc<AppState>>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> Result<Json<Vec<Player>>, GameError> {
    let (skip, limit) = page.validated()?;
    let players = run(&state, move |service| service.list_players(skip, limit)).await?;
    debug!(count = players.len(), "Players listed");
    Ok(Json(players))
}

/// Opens a match.
#[instrument(skip(state))]
pub(super) async fn create_match(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<NewMatchRequest>,
) -> Result<Json<Match>, GameError> {
    let game = run(&state, move |service| service.create_match(request.player1_id)).await?;
    Ok(Json(game))
}

/// Lists matches.
#[instrument(skip(state))]
pub(super) async fn list_matches(
    State(state): State<Arc<AppState>>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> Result<Json<Vec<Match>>, GameError> {
    let (skip, limit) = page.validated()?;
    let matches = run(&state, move |service| service.list_matches(skip, limit)).await?;
    debug!(count = matches.len(), "Matches listed");
    Ok(Json(matches))
}

/// Reads one match.
#[instrument(skip(state))]
pub(super) async fn get_match(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<MatchId>,
) -> Result<Json<Match>, GameError> {
    let game = run(&state, move |service| service.get_match(id)).await?;
    Ok(Json(game))
}

/// Seats the second player.
#[instrument(skip(state))]
pub(super) async fn join_match(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<MatchId>,
    ApiQuery(params): ApiQuery<JoinParams>,
) -> Result<Json<Match>, GameError> {
    let game = run(&state, move |service| service.join_match(id, params.player_id)).await?;
    Ok(Json(game))
}

/// Applies a move.
#[instrument(skip(state))]
pub(super) async fn make_move(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<MatchId>,
    ApiJson(request): ApiJson<MoveRequest>,
) -> Result<Json<Match>, GameError> {
    let game = run(&state, move |service| {
        service.make_move(id, request.player_id, request.row, request.col)
    })
    .await?;
    Ok(Json(game))
}

/// Top three players by wins.
#[instrument(skip(state))]
pub(super) async fn leaderboard_by_wins(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PlayerWins>>, GameError> {
    let ranked = run(&state, |service| service.leaderboard_by_wins()).await?;
    Ok(Json(ranked))
}

/// Top three players by average moves per win.
#[instrument(skip(state))]
pub(super) async fn leaderboard_by_efficiency(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PlayerEfficiency>>, GameError> {
    let ranked = run(&state, |service| service.leaderboard_by_efficiency()).await?;
    Ok(Json(ranked))
}
