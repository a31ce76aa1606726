//! Settlement handlers: all-player stats, debts, head-to-head.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{DebtResponse, HeadToHeadResponse, PlayerStatsResponse};
use crate::app_state::AppState;
use crate::domain::PlayerId;
use crate::error::{ErrorResponse, LedgerError};

/// `GET /stats`: Statistics of every player.
///
/// # Errors
///
/// Returns [`LedgerError::DataIntegrity`] on a malformed ledger.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "Settlement",
    summary = "All player statistics",
    responses(
        (status = 200, description = "Stats for every player, sorted by name", body = Vec<PlayerStatsResponse>),
        (status = 500, description = "Ledger integrity fault", body = ErrorResponse),
    )
)]
pub async fn all_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlayerStatsResponse>>, LedgerError> {
    let stats = state.service.all_stats().await?;
    Ok(Json(stats.into_iter().map(PlayerStatsResponse::from).collect()))
}

/// `GET /debts`: Netted pairwise debts.
///
/// # Errors
///
/// Returns [`LedgerError::DataIntegrity`] on a malformed ledger.
#[utoipa::path(
    get,
    path = "/debts",
    tag = "Settlement",
    summary = "Who owes whom",
    description = "Nets all finished games per pair of players and returns one entry per pair with a non-zero balance. Debts are not simplified across more than two players.",
    responses(
        (status = 200, description = "Pairwise debts", body = Vec<DebtResponse>),
        (status = 500, description = "Ledger integrity fault", body = ErrorResponse),
    )
)]
pub async fn debts(State(state): State<AppState>) -> Result<Json<Vec<DebtResponse>>, LedgerError> {
    let debts = state.service.debts().await?;
    Ok(Json(debts.into_iter().map(DebtResponse::from).collect()))
}

/// `GET /head-to-head/{player1_id}/{player2_id}`: Record between two players.
///
/// # Errors
///
/// Returns [`LedgerError::PlayerNotFound`] if either player is unknown.
#[utoipa::path(
    get,
    path = "/head-to-head/{player1_id}/{player2_id}",
    tag = "Settlement",
    summary = "Head-to-head record",
    params(
        ("player1_id" = uuid::Uuid, Path, description = "First player UUID"),
        ("player2_id" = uuid::Uuid, Path, description = "Second player UUID"),
    ),
    responses(
        (status = 200, description = "Finished-game record", body = HeadToHeadResponse),
        (status = 404, description = "Player not found", body = ErrorResponse),
    )
)]
pub async fn head_to_head(
    State(state): State<AppState>,
    Path((player1, player2)): Path<(uuid::Uuid, uuid::Uuid)>,
) -> Result<Json<HeadToHeadResponse>, LedgerError> {
    let view = state
        .service
        .head_to_head(PlayerId::from_uuid(player1), PlayerId::from_uuid(player2))
        .await?;
    Ok(Json(view.into()))
}

/// Settlement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(all_stats))
        .route("/debts", get(debts))
        .route("/head-to-head/{player1_id}/{player2_id}", get(head_to_head))
}
