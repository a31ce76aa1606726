//! Per-player aggregate statistics.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::SettlementError;
use super::fold::{Fold, Tally, ZERO_MONEY};
use crate::domain::{Player, PlayerId};

/// Decimal places kept in [`PlayerStats::win_rate`].
pub const WIN_RATE_SCALE: u32 = 1;

/// Derived statistics for one player. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    /// Player the stats belong to.
    pub player_id: PlayerId,
    /// Player display name.
    pub name: String,
    /// Finished games played.
    pub total_games: u32,
    /// Finished games won.
    pub wins: u32,
    /// Finished games lost.
    pub losses: u32,
    /// Sum of stakes won.
    pub total_won: Decimal,
    /// Sum of stakes lost.
    pub total_lost: Decimal,
    /// `total_won - total_lost`.
    pub balance: Decimal,
    /// Win percentage with one decimal place; `0` without games.
    pub win_rate: Decimal,
}

impl PlayerStats {
    fn from_tally(player: &Player, tally: &Tally) -> Result<Self, SettlementError> {
        let overflow = || SettlementError::TotalOverflow {
            player_id: player.id,
        };
        let total_games = tally.wins.checked_add(tally.losses).ok_or_else(overflow)?;
        let balance = tally
            .total_won
            .checked_sub(tally.total_lost)
            .ok_or_else(overflow)?;
        Ok(Self {
            player_id: player.id,
            name: player.name.clone(),
            total_games,
            wins: tally.wins,
            losses: tally.losses,
            total_won: tally.total_won,
            total_lost: tally.total_lost,
            balance,
            win_rate: win_rate_percent(tally.wins, total_games),
        })
    }

    /// All-zero stats for a player without finished games.
    #[must_use]
    pub fn empty(player: &Player) -> Self {
        Self {
            player_id: player.id,
            name: player.name.clone(),
            total_games: 0,
            wins: 0,
            losses: 0,
            total_won: ZERO_MONEY,
            total_lost: ZERO_MONEY,
            balance: ZERO_MONEY,
            win_rate: Decimal::ZERO,
        }
    }
}

/// Computes `wins / total * 100` rounded to [`WIN_RATE_SCALE`] places,
/// midpoint away from zero. Returns `0` when `total` is zero.
#[must_use]
pub fn win_rate_percent(wins: u32, total: u32) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    let ratio = Decimal::from(wins) * Decimal::ONE_HUNDRED / Decimal::from(total);
    ratio.round_dp_with_strategy(WIN_RATE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Builds one [`PlayerStats`] per registered player, sorted by name then
/// id. Players absent from the fold get [`PlayerStats::empty`].
///
/// # Errors
///
/// Returns [`SettlementError::TotalOverflow`] if a derived total does not
/// fit the decimal range.
pub fn aggregate(players: &[Player], fold: &Fold) -> Result<Vec<PlayerStats>, SettlementError> {
    let mut ordered: Vec<&Player> = players.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    ordered
        .into_iter()
        .map(|player| match fold.tally(player.id) {
            Some(tally) => PlayerStats::from_tally(player, tally),
            None => Ok(PlayerStats::empty(player)),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn win_rate_of_no_games_is_zero() {
        assert_eq!(win_rate_percent(0, 0), Decimal::ZERO);
    }

    #[test]
    fn two_of_three_rounds_to_one_place() {
        assert_eq!(win_rate_percent(2, 3), Decimal::new(667, 1));
        assert_eq!(win_rate_percent(1, 3), Decimal::new(333, 1));
    }

    #[test]
    fn midpoint_rounds_away_from_zero() {
        // 1/8 = 12.5%, 1/16 = 6.25% -> 6.3
        assert_eq!(win_rate_percent(1, 8), Decimal::new(125, 1));
        assert_eq!(win_rate_percent(1, 16), Decimal::new(63, 1));
    }

    #[test]
    fn perfect_record_is_one_hundred() {
        assert_eq!(win_rate_percent(5, 5), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn empty_stats_are_zeroed() {
        let Ok(player) = Player::new("Anna") else {
            panic!("valid player");
        };
        let stats = PlayerStats::empty(&player);
        assert_eq!(stats.total_games, 0);
        assert_eq!(stats.balance, Decimal::ZERO);
        assert_eq!(stats.win_rate, Decimal::ZERO);
    }

    #[test]
    fn aggregate_covers_every_player_in_name_order() {
        let (Ok(b), Ok(a)) = (Player::new("Boris"), Player::new("Anna")) else {
            panic!("valid players");
        };
        let Ok(stats) = aggregate(&[b, a], &Fold::default()) else {
            panic!("aggregate failed");
        };
        let names: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Anna", "Boris"]);
    }
}
