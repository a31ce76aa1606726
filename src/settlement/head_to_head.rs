//! Head-to-head record between two players.

use serde::Serialize;

use super::SettlementError;
use super::fold::Outcome;
use crate::domain::{Game, PlayerId};

/// Finished-game record of two players against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeadToHead {
    /// First player as requested.
    pub player1: PlayerId,
    /// Second player as requested.
    pub player2: PlayerId,
    /// Games `player1` won against `player2`.
    pub player1_wins: u32,
    /// Games `player2` won against `player1`.
    pub player2_wins: u32,
    /// Finished games between the two.
    pub total_games: u32,
}

/// Counts the finished games between `player1` and `player2`.
///
/// Active games and games involving anyone else are ignored. Asking for a
/// player against themselves yields an empty record.
///
/// # Errors
///
/// Returns a [`SettlementError`] if a relevant finished game is
/// malformed.
pub fn head_to_head(
    player1: PlayerId,
    player2: PlayerId,
    games: &[Game],
) -> Result<HeadToHead, SettlementError> {
    let mut record = HeadToHead {
        player1,
        player2,
        player1_wins: 0,
        player2_wins: 0,
        total_games: 0,
    };
    if player1 == player2 {
        return Ok(record);
    }
    for game in games {
        if !(game.involves(player1) && game.involves(player2)) {
            continue;
        }
        let Some(outcome) = Outcome::from_game(game)? else {
            continue;
        };
        if outcome.winner == player1 {
            record.player1_wins = record.player1_wins.saturating_add(1);
        } else {
            record.player2_wins = record.player2_wins.saturating_add(1);
        }
        record.total_games = record.total_games.saturating_add(1);
    }
    Ok(record)
}
