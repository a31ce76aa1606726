//! Game handlers: create, list, get, finish, delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateGameRequest, FinishGameRequest, GameResponse, GamesQuery, StatusMessage,
};
use crate::app_state::AppState;
use crate::domain::GameId;
use crate::error::{ErrorResponse, LedgerError};

/// `POST /games`: Start a new game.
///
/// # Errors
///
/// Returns [`LedgerError`] on an invalid stake, an invalid pairing, or an
/// unknown player.
#[utoipa::path(
    post,
    path = "/games",
    tag = "Games",
    summary = "Start a game",
    description = "Creates an active game between two distinct registered players. The breaker must be one of them and the stake must be positive with at most two decimal places.",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game started", body = GameResponse),
        (status = 400, description = "Invalid stake or pairing", body = ErrorResponse),
        (status = 404, description = "Player not found", body = ErrorResponse),
    )
)]
pub async fn create_game(
    State(state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let view = state
        .service
        .create_game(req.player1_id, req.player2_id, req.breaker_id, req.stake)
        .await?;
    Ok((StatusCode::CREATED, Json(GameResponse::from(view))))
}

/// `GET /games`: Most recent games first.
///
/// # Errors
///
/// Returns [`LedgerError::Internal`] on an inconsistent ledger.
#[utoipa::path(
    get,
    path = "/games",
    tag = "Games",
    summary = "List recent games",
    params(GamesQuery),
    responses(
        (status = 200, description = "Games, newest first", body = Vec<GameResponse>),
    )
)]
pub async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<GamesQuery>,
) -> Result<Json<Vec<GameResponse>>, LedgerError> {
    let limit = state.config.games_limit(query.limit);
    let games = state.service.list_games(limit).await?;
    Ok(Json(games.into_iter().map(GameResponse::from).collect()))
}

/// `GET /games/active`: Games awaiting a result.
///
/// # Errors
///
/// Returns [`LedgerError::Internal`] on an inconsistent ledger.
#[utoipa::path(
    get,
    path = "/games/active",
    tag = "Games",
    summary = "List active games",
    responses(
        (status = 200, description = "Active games, newest first", body = Vec<GameResponse>),
    )
)]
pub async fn active_games(
    State(state): State<AppState>,
) -> Result<Json<Vec<GameResponse>>, LedgerError> {
    let games = state.service.active_games().await?;
    Ok(Json(games.into_iter().map(GameResponse::from).collect()))
}

/// `GET /games/{id}`: Get one game.
///
/// # Errors
///
/// Returns [`LedgerError::GameNotFound`] if the game does not exist.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "Games",
    summary = "Get a game",
    params(
        ("id" = uuid::Uuid, Path, description = "Game UUID"),
    ),
    responses(
        (status = 200, description = "Game", body = GameResponse),
        (status = 404, description = "Game not found", body = ErrorResponse),
    )
)]
pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<GameResponse>, LedgerError> {
    let view = state.service.get_game(GameId::from_uuid(id)).await?;
    Ok(Json(view.into()))
}

/// `POST /games/{id}/finish`: Record the winner.
///
/// # Errors
///
/// Returns [`LedgerError::GameNotFound`],
/// [`LedgerError::GameAlreadyFinished`], or
/// [`LedgerError::WinnerNotParticipant`].
#[utoipa::path(
    post,
    path = "/games/{id}/finish",
    tag = "Games",
    summary = "Finish a game",
    description = "Marks an active game as finished with the given winner. A game can be finished exactly once.",
    params(
        ("id" = uuid::Uuid, Path, description = "Game UUID"),
    ),
    request_body = FinishGameRequest,
    responses(
        (status = 200, description = "Game finished", body = GameResponse),
        (status = 400, description = "Winner is not a participant", body = ErrorResponse),
        (status = 404, description = "Game not found", body = ErrorResponse),
        (status = 409, description = "Game already finished", body = ErrorResponse),
    )
)]
pub async fn finish_game(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<FinishGameRequest>,
) -> Result<Json<GameResponse>, LedgerError> {
    let view = state
        .service
        .finish_game(GameId::from_uuid(id), req.winner_id)
        .await?;
    Ok(Json(view.into()))
}

/// `DELETE /games/{id}`: Remove a game.
///
/// # Errors
///
/// Returns [`LedgerError::GameNotFound`] if the game does not exist.
#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "Games",
    summary = "Delete a game",
    description = "Removes a game. Stats and debts no longer include it.",
    params(
        ("id" = uuid::Uuid, Path, description = "Game UUID"),
    ),
    responses(
        (status = 200, description = "Game deleted", body = StatusMessage),
        (status = 404, description = "Game not found", body = ErrorResponse),
    )
)]
pub async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<StatusMessage>, LedgerError> {
    state.service.delete_game(GameId::from_uuid(id)).await?;
    Ok(Json(StatusMessage::ok("game deleted")))
}

/// Game routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/active", get(active_games))
        .route("/games/{id}", get(get_game).delete(delete_game))
        .route("/games/{id}/finish", post(finish_game))
}
