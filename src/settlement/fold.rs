//! Single validated pass over the finished games.
//!
//! Both derived views come out of one [`Fold`]: per-player tallies feed
//! the stats aggregator and per-pair net flows feed the debt netting.
//! Accumulators are `BTreeMap`s and amounts are exact decimals, so the
//! result does not depend on the order games are visited in.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use super::SettlementError;
use crate::domain::stake::STAKE_SCALE;
use crate::domain::{Game, GameId, Player, PlayerId};

/// Zero with the money scale, so totals render as `0.00`.
pub(crate) const ZERO_MONEY: Decimal = Decimal::from_parts(0, 0, 0, false, STAKE_SCALE);

/// Validated result of one finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Source game.
    pub game_id: GameId,
    /// Participant who won the stake.
    pub winner: PlayerId,
    /// Participant who pays the stake.
    pub loser: PlayerId,
    /// Amount moved from loser to winner.
    pub stake: Decimal,
}

impl Outcome {
    /// Validates a game record.
    ///
    /// Returns `Ok(None)` for active games, which take no part in
    /// settlement.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::SelfPlay`],
    /// [`SettlementError::MissingWinner`] or
    /// [`SettlementError::WinnerNotParticipant`] for malformed finished
    /// games.
    pub fn from_game(game: &Game) -> Result<Option<Self>, SettlementError> {
        if !game.is_finished() {
            return Ok(None);
        }
        if game.player1 == game.player2 {
            return Err(SettlementError::SelfPlay {
                game_id: game.id,
                player_id: game.player1,
            });
        }
        let winner = game
            .winner
            .ok_or(SettlementError::MissingWinner { game_id: game.id })?;
        let loser = game
            .opponent_of(winner)
            .ok_or(SettlementError::WinnerNotParticipant {
                game_id: game.id,
                winner,
            })?;
        Ok(Some(Self {
            game_id: game.id,
            winner,
            loser,
            stake: game.stake.amount(),
        }))
    }
}

/// Running totals for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    /// Games won.
    pub wins: u32,
    /// Games lost.
    pub losses: u32,
    /// Sum of stakes won.
    pub total_won: Decimal,
    /// Sum of stakes lost.
    pub total_lost: Decimal,
}

impl Default for Tally {
    fn default() -> Self {
        Self {
            wins: 0,
            losses: 0,
            total_won: ZERO_MONEY,
            total_lost: ZERO_MONEY,
        }
    }
}

/// Unordered player pair, stored with the smaller id first.
///
/// The orientation only deduplicates the pair; it never decides who owes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    low: PlayerId,
    high: PlayerId,
}

impl PairKey {
    /// Canonicalises two distinct players into a key.
    #[must_use]
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Player with the smaller id.
    #[must_use]
    pub const fn low(&self) -> PlayerId {
        self.low
    }

    /// Player with the larger id.
    #[must_use]
    pub const fn high(&self) -> PlayerId {
        self.high
    }
}

/// Accumulated tallies and pair flows for one ledger snapshot.
#[derive(Debug, Clone, Default)]
pub struct Fold {
    tallies: BTreeMap<PlayerId, Tally>,
    /// Signed net per pair: positive means `high` owes `low`.
    flows: BTreeMap<PairKey, Decimal>,
}

impl Fold {
    /// Folds the finished games of a snapshot.
    ///
    /// Active games are skipped. Every participant must be registered in
    /// `players`.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed game, unknown participant, or amount
    /// overflow; see [`SettlementError`].
    pub fn run(players: &[Player], games: &[Game]) -> Result<Self, SettlementError> {
        let known: BTreeSet<PlayerId> = players.iter().map(|p| p.id).collect();
        let mut fold = Self::default();
        for game in games {
            let Some(outcome) = Outcome::from_game(game)? else {
                continue;
            };
            for player_id in [outcome.winner, outcome.loser] {
                if !known.contains(&player_id) {
                    return Err(SettlementError::UnknownPlayer {
                        game_id: outcome.game_id,
                        player_id,
                    });
                }
            }
            fold.apply(&outcome)?;
        }
        Ok(fold)
    }

    fn apply(&mut self, outcome: &Outcome) -> Result<(), SettlementError> {
        let overflow = || SettlementError::AmountOverflow {
            game_id: outcome.game_id,
        };

        let winner = self.tallies.entry(outcome.winner).or_default();
        winner.wins = winner.wins.checked_add(1).ok_or_else(overflow)?;
        winner.total_won = winner
            .total_won
            .checked_add(outcome.stake)
            .ok_or_else(overflow)?;

        let loser = self.tallies.entry(outcome.loser).or_default();
        loser.losses = loser.losses.checked_add(1).ok_or_else(overflow)?;
        loser.total_lost = loser
            .total_lost
            .checked_add(outcome.stake)
            .ok_or_else(overflow)?;

        let key = PairKey::new(outcome.winner, outcome.loser);
        let signed = if outcome.winner == key.low() {
            outcome.stake
        } else {
            -outcome.stake
        };
        let net = self.flows.entry(key).or_insert(ZERO_MONEY);
        *net = net.checked_add(signed).ok_or_else(overflow)?;
        Ok(())
    }

    /// Returns the tally of a player, or `None` if they have no finished
    /// games.
    #[must_use]
    pub fn tally(&self, player: PlayerId) -> Option<&Tally> {
        self.tallies.get(&player)
    }

    /// Iterates pair flows in ascending pair order.
    ///
    /// A positive value means the `high` player owes the `low` player.
    pub fn flows(&self) -> impl Iterator<Item = (PairKey, Decimal)> + '_ {
        self.flows.iter().map(|(k, v)| (*k, *v))
    }
}
