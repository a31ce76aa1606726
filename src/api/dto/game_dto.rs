//! Game DTOs for create, finish, get and list operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::player_dto::PlayerResponse;
use crate::domain::{GameId, GameStatus, PlayerId};
use crate::service::GameView;

/// Request body for `POST /games`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGameRequest {
    /// First participant.
    pub player1_id: PlayerId,
    /// Second participant.
    pub player2_id: PlayerId,
    /// Participant who breaks.
    pub breaker_id: PlayerId,
    /// Wager amount. Accepts a JSON number or a decimal string.
    #[schema(value_type = String, example = "500.00")]
    pub stake: Decimal,
}

/// Request body for `POST /games/{id}/finish`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FinishGameRequest {
    /// Winning participant.
    pub winner_id: PlayerId,
}

/// A game with every referenced player resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameResponse {
    /// Game identifier.
    pub id: GameId,
    /// First participant.
    pub player1: PlayerResponse,
    /// Second participant.
    pub player2: PlayerResponse,
    /// Participant who broke.
    pub breaker: PlayerResponse,
    /// Winner, present once finished.
    pub winner: Option<PlayerResponse>,
    /// Wager amount with two decimal places.
    #[schema(value_type = String, example = "500.00")]
    pub stake: Decimal,
    /// Lifecycle state.
    pub status: GameStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp, present once finished.
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<GameView> for GameResponse {
    fn from(view: GameView) -> Self {
        Self {
            id: view.game.id,
            player1: view.player1.into(),
            player2: view.player2.into(),
            breaker: view.breaker.into(),
            winner: view.winner.map(PlayerResponse::from),
            stake: view.game.stake.amount(),
            status: view.game.status,
            created_at: view.game.created_at,
            finished_at: view.game.finished_at,
        }
    }
}
