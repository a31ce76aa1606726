//! Database rows for players and games.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Game, GameId, GameStatus, Player, PlayerId, Stake};
use crate::error::LedgerError;

/// A row from the `players` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerRow {
    /// Player identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// A row from the `games` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GameRow {
    /// Game identifier.
    pub id: Uuid,
    /// First participant.
    pub player1_id: Uuid,
    /// Second participant.
    pub player2_id: Uuid,
    /// Participant who broke.
    pub breaker_id: Uuid,
    /// Winner once finished.
    pub winner_id: Option<Uuid>,
    /// `NUMERIC(10,2)` stake.
    pub stake: Decimal,
    /// `"active"` or `"finished"`.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Finish timestamp.
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Self {
            id: PlayerId::from_uuid(row.id),
            name: row.name,
            created_at: row.created_at,
        }
    }
}

impl From<&Game> for GameRow {
    fn from(game: &Game) -> Self {
        Self {
            id: *game.id.as_uuid(),
            player1_id: *game.player1.as_uuid(),
            player2_id: *game.player2.as_uuid(),
            breaker_id: *game.breaker.as_uuid(),
            winner_id: game.winner.map(Uuid::from),
            stake: game.stake.amount(),
            status: game.status.as_str().to_string(),
            created_at: game.created_at,
            finished_at: game.finished_at,
        }
    }
}

impl TryFrom<GameRow> for Game {
    type Error = LedgerError;

    /// Field-level decoding only; lifecycle consistency is left to the
    /// settlement fold, which reports it with the game id.
    fn try_from(row: GameRow) -> Result<Self, Self::Error> {
        let status = GameStatus::parse(&row.status).ok_or_else(|| {
            LedgerError::PersistenceError(format!(
                "game {} has unknown status {:?}",
                row.id, row.status
            ))
        })?;
        let stake = Stake::new(row.stake).map_err(|e| {
            LedgerError::PersistenceError(format!("game {} has invalid stake: {e}", row.id))
        })?;
        Ok(Self {
            id: GameId::from_uuid(row.id),
            player1: PlayerId::from_uuid(row.player1_id),
            player2: PlayerId::from_uuid(row.player2_id),
            breaker: PlayerId::from_uuid(row.breaker_id),
            stake,
            status,
            winner: row.winner_id.map(PlayerId::from_uuid),
            created_at: row.created_at,
            finished_at: row.finished_at,
        })
    }
}
