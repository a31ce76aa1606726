//! Derived view DTOs: player stats, debts and head-to-head records.
//!
//! Money amounts serialize as decimal strings. `win_rate` is a percentage
//! and serializes as a JSON number.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::player_dto::PlayerResponse;
use crate::domain::PlayerId;
use crate::service::{DebtView, HeadToHeadView};
use crate::settlement::PlayerStats;

/// Aggregate statistics of one player over finished games.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerStatsResponse {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Finished games played.
    pub total_games: u32,
    /// Finished games won.
    pub wins: u32,
    /// Finished games lost.
    pub losses: u32,
    /// Win percentage rounded to one decimal place.
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 66.7)]
    pub win_rate: Decimal,
    /// Sum of stakes won.
    #[schema(value_type = String, example = "1000.00")]
    pub total_won: Decimal,
    /// Sum of stakes lost.
    #[schema(value_type = String, example = "300.00")]
    pub total_lost: Decimal,
    /// `total_won - total_lost`.
    #[schema(value_type = String, example = "700.00")]
    pub balance: Decimal,
}

impl From<PlayerStats> for PlayerStatsResponse {
    fn from(stats: PlayerStats) -> Self {
        Self {
            id: stats.player_id,
            name: stats.name,
            total_games: stats.total_games,
            wins: stats.wins,
            losses: stats.losses,
            win_rate: stats.win_rate,
            total_won: stats.total_won,
            total_lost: stats.total_lost,
            balance: stats.balance,
        }
    }
}

/// Net amount one player owes another.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DebtResponse {
    /// Debtor.
    pub from_player: PlayerResponse,
    /// Creditor.
    pub to_player: PlayerResponse,
    /// Amount owed, always positive.
    #[schema(value_type = String, example = "700.00")]
    pub amount: Decimal,
}

impl From<DebtView> for DebtResponse {
    fn from(view: DebtView) -> Self {
        Self {
            from_player: view.from.into(),
            to_player: view.to.into(),
            amount: view.amount,
        }
    }
}

/// Finished-game record between two players.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HeadToHeadResponse {
    /// First player as requested.
    pub player1: PlayerResponse,
    /// Second player as requested.
    pub player2: PlayerResponse,
    /// Games `player1` won.
    pub player1_wins: u32,
    /// Games `player2` won.
    pub player2_wins: u32,
    /// Finished games between the two.
    pub total_games: u32,
}

impl From<HeadToHeadView> for HeadToHeadResponse {
    fn from(view: HeadToHeadView) -> Self {
        Self {
            player1: view.player1.into(),
            player2: view.player2.into(),
            player1_wins: view.record.player1_wins,
            player2_wins: view.record.player2_wins,
            total_games: view.record.total_games,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Player;

    #[test]
    fn money_is_a_string_and_win_rate_a_number() {
        let Ok(player) = Player::new("Anna") else {
            panic!("valid player");
        };
        let mut stats = PlayerStats::empty(&player);
        stats.win_rate = Decimal::new(667, 1);
        stats.balance = Decimal::new(70000, 2);
        let Ok(json) = serde_json::to_value(PlayerStatsResponse::from(stats)) else {
            panic!("serialization failed");
        };
        assert_eq!(json.get("balance"), Some(&serde_json::json!("700.00")));
        assert_eq!(json.get("total_won"), Some(&serde_json::json!("0.00")));
        assert_eq!(json.get("win_rate"), Some(&serde_json::json!(66.7)));
        assert_eq!(
            json.get("id"),
            Some(&serde_json::json!(player.id.to_string()))
        );
    }
}
