//! Player handlers: register, list, get, delete, stats.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{CreatePlayerRequest, PlayerResponse, PlayerStatsResponse, StatusMessage};
use crate::app_state::AppState;
use crate::domain::PlayerId;
use crate::error::{ErrorResponse, LedgerError};

/// `POST /players`: Register a new player.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidPlayerName`] for a blank or overlong name.
#[utoipa::path(
    post,
    path = "/players",
    tag = "Players",
    summary = "Register a player",
    description = "Creates a player with the given display name. The name is trimmed and must be 1 to 100 characters long.",
    request_body = CreatePlayerRequest,
    responses(
        (status = 201, description = "Player registered", body = PlayerResponse),
        (status = 400, description = "Invalid name", body = ErrorResponse),
    )
)]
pub async fn create_player(
    State(state): State<AppState>,
    Json(req): Json<CreatePlayerRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let player = state.service.create_player(&req.name).await?;
    Ok((StatusCode::CREATED, Json(PlayerResponse::from(player))))
}

/// `GET /players`: List all players sorted by name.
#[utoipa::path(
    get,
    path = "/players",
    tag = "Players",
    summary = "List players",
    responses(
        (status = 200, description = "All players sorted by name", body = Vec<PlayerResponse>),
    )
)]
pub async fn list_players(State(state): State<AppState>) -> impl IntoResponse {
    let players: Vec<PlayerResponse> = state
        .service
        .list_players()
        .await
        .into_iter()
        .map(PlayerResponse::from)
        .collect();
    Json(players)
}

/// `GET /players/{id}`: Get one player.
///
/// # Errors
///
/// Returns [`LedgerError::PlayerNotFound`] if the player does not exist.
#[utoipa::path(
    get,
    path = "/players/{id}",
    tag = "Players",
    summary = "Get a player",
    params(
        ("id" = uuid::Uuid, Path, description = "Player UUID"),
    ),
    responses(
        (status = 200, description = "Player", body = PlayerResponse),
        (status = 404, description = "Player not found", body = ErrorResponse),
    )
)]
pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<PlayerResponse>, LedgerError> {
    let player = state.service.get_player(PlayerId::from_uuid(id)).await?;
    Ok(Json(player.into()))
}

/// `DELETE /players/{id}`: Delete a player without games.
///
/// # Errors
///
/// Returns [`LedgerError::PlayerNotFound`] or
/// [`LedgerError::PlayerReferenced`].
#[utoipa::path(
    delete,
    path = "/players/{id}",
    tag = "Players",
    summary = "Delete a player",
    description = "Deletes a player. Players referenced by any game cannot be deleted; delete their games first.",
    params(
        ("id" = uuid::Uuid, Path, description = "Player UUID"),
    ),
    responses(
        (status = 200, description = "Player deleted", body = StatusMessage),
        (status = 404, description = "Player not found", body = ErrorResponse),
        (status = 409, description = "Player is referenced by games", body = ErrorResponse),
    )
)]
pub async fn delete_player(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<StatusMessage>, LedgerError> {
    state.service.delete_player(PlayerId::from_uuid(id)).await?;
    Ok(Json(StatusMessage::ok("player deleted")))
}

/// `GET /players/{id}/stats`: Aggregate statistics of one player.
///
/// # Errors
///
/// Returns [`LedgerError::PlayerNotFound`] or
/// [`LedgerError::DataIntegrity`].
#[utoipa::path(
    get,
    path = "/players/{id}/stats",
    tag = "Players",
    summary = "Player statistics",
    description = "Recomputes the player's wins, losses, totals, balance and win rate over all finished games.",
    params(
        ("id" = uuid::Uuid, Path, description = "Player UUID"),
    ),
    responses(
        (status = 200, description = "Player statistics", body = PlayerStatsResponse),
        (status = 404, description = "Player not found", body = ErrorResponse),
    )
)]
pub async fn player_stats(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<PlayerStatsResponse>, LedgerError> {
    let stats = state.service.player_stats(PlayerId::from_uuid(id)).await?;
    Ok(Json(stats.into()))
}

/// Player routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/players", get(list_players).post(create_player))
        .route("/players/{id}", get(get_player).delete(delete_player))
        .route("/players/{id}/stats", get(player_stats))
}
