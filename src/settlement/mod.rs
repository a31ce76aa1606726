//! Settlement engine: stats aggregation and pairwise debt netting.
//!
//! Everything here is a pure, synchronous function of a
//! [`LedgerSnapshot`]. Nothing is cached between calls; every read of
//! stats or debts recomputes from the snapshot it is handed.
//!
//! ```text
//! LedgerSnapshot ── Fold::run ──┬── stats::aggregate ──> Vec<PlayerStats>
//!   (players +                  │
//!    finished games)            └── debts::net_pairs ──> Vec<Debt>
//! ```
//!
//! The two views must agree: for every player, debts owed to them minus
//! debts they owe equals their balance. [`Settlement::verify_conservation`]
//! checks exactly that.

pub mod debts;
pub mod error;
pub mod fold;
pub mod head_to_head;
pub mod stats;

use std::collections::BTreeMap;

use rust_decimal::Decimal;

pub use debts::Debt;
pub use error::SettlementError;
pub use fold::{Fold, Outcome};
pub use head_to_head::{HeadToHead, head_to_head};
pub use stats::{PlayerStats, win_rate_percent};

use crate::domain::{Game, LedgerSnapshot, Player, PlayerId};

/// Both derived views computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// One entry per registered player, sorted by name then id.
    pub stats: Vec<PlayerStats>,
    /// Netted debts, at most one per unordered pair.
    pub debts: Vec<Debt>,
}

impl Settlement {
    /// Returns the stats of one player.
    #[must_use]
    pub fn stats_for(&self, player: PlayerId) -> Option<&PlayerStats> {
        self.stats.iter().find(|s| s.player_id == player)
    }

    /// Net position of every player implied by the debt set:
    /// owed to them minus owed by them.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::TotalOverflow`] if a sum overflows.
    pub fn debt_positions(&self) -> Result<BTreeMap<PlayerId, Decimal>, SettlementError> {
        let mut positions: BTreeMap<PlayerId, Decimal> = BTreeMap::new();
        for debt in &self.debts {
            let to = positions.entry(debt.to).or_insert(Decimal::ZERO);
            *to = to
                .checked_add(debt.amount)
                .ok_or(SettlementError::TotalOverflow { player_id: debt.to })?;
            let from = positions.entry(debt.from).or_insert(Decimal::ZERO);
            *from = from
                .checked_sub(debt.amount)
                .ok_or(SettlementError::TotalOverflow {
                    player_id: debt.from,
                })?;
        }
        Ok(positions)
    }

    /// Checks that the debt set reproduces every player's balance.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::ConservationViolated`] naming the first
    /// player whose position disagrees, including a debtor or creditor
    /// without a stats entry.
    pub fn verify_conservation(&self) -> Result<(), SettlementError> {
        let mut positions = self.debt_positions()?;
        for stats in &self.stats {
            let net = positions.remove(&stats.player_id).unwrap_or(Decimal::ZERO);
            if net != stats.balance {
                return Err(SettlementError::ConservationViolated {
                    player_id: stats.player_id,
                    balance: stats.balance,
                    net,
                });
            }
        }
        if let Some((player_id, net)) = positions.into_iter().next() {
            return Err(SettlementError::ConservationViolated {
                player_id,
                balance: Decimal::ZERO,
                net,
            });
        }
        Ok(())
    }
}

/// Runs the shared fold once and derives both views.
///
/// # Errors
///
/// Returns a [`SettlementError`] on the first malformed game, unknown
/// participant, or overflow. Nothing is partially returned.
pub fn settle(players: &[Player], games: &[Game]) -> Result<Settlement, SettlementError> {
    let fold = Fold::run(players, games)?;
    Ok(Settlement {
        stats: stats::aggregate(players, &fold)?,
        debts: debts::net_pairs(&fold),
    })
}

/// [`settle`] over a [`LedgerSnapshot`].
///
/// # Errors
///
/// See [`settle`].
pub fn settle_snapshot(snapshot: &LedgerSnapshot) -> Result<Settlement, SettlementError> {
    settle(&snapshot.players, &snapshot.games)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;

    use super::*;
    use crate::domain::Stake;

    fn players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| {
                let Ok(p) = Player::new(&format!("P{i}")) else {
                    panic!("valid player");
                };
                p
            })
            .collect()
    }

    fn id(players: &[Player], i: usize) -> PlayerId {
        let Some(p) = players.get(i) else {
            panic!("no player {i}");
        };
        p.id
    }

    fn money(units: i64) -> Decimal {
        Decimal::from(units)
    }

    fn finished_with(p1: PlayerId, p2: PlayerId, winner: PlayerId, stake: Decimal) -> Game {
        let Ok(stake) = Stake::new(stake) else {
            panic!("valid stake");
        };
        let Ok(mut game) = Game::new(p1, p2, p1, stake) else {
            panic!("valid game");
        };
        if game.finish(winner, Utc::now()).is_err() {
            panic!("finish failed");
        }
        game
    }

    /// `winner` beats `loser` for `stake` whole units.
    fn beat(winner: PlayerId, loser: PlayerId, stake: i64) -> Game {
        finished_with(winner, loser, winner, money(stake))
    }

    fn run(players: &[Player], games: &[Game]) -> Settlement {
        let Ok(settlement) = settle(players, games) else {
            panic!("settlement failed");
        };
        settlement
    }

    #[test]
    fn empty_ledger_yields_zeroed_stats_and_no_debts() {
        let ps = players(3);
        let s = run(&ps, &[]);
        assert!(s.debts.is_empty());
        assert_eq!(s.stats.len(), 3);
        for stats in &s.stats {
            assert_eq!(stats.total_games, 0);
            assert_eq!(stats.wins, 0);
            assert_eq!(stats.losses, 0);
            assert_eq!(stats.win_rate, Decimal::ZERO);
            assert_eq!(stats.balance, Decimal::ZERO);
        }
        assert!(s.verify_conservation().is_ok());
    }

    #[test]
    fn no_players_and_no_games_is_not_an_error() {
        let s = run(&[], &[]);
        assert!(s.stats.is_empty());
        assert!(s.debts.is_empty());
    }

    #[test]
    fn bidirectional_games_net_into_one_debt() {
        let ps = players(2);
        let (a, b) = (id(&ps, 0), id(&ps, 1));
        let games = vec![beat(a, b, 500), beat(a, b, 500), beat(b, a, 300)];

        let s = run(&ps, &games);
        assert_eq!(
            s.debts,
            vec![Debt {
                from: b,
                to: a,
                amount: money(700),
            }]
        );
    }

    #[test]
    fn repeated_wins_collapse_into_single_entry() {
        let ps = players(2);
        let (a, b) = (id(&ps, 0), id(&ps, 1));
        let games = vec![
            beat(a, b, 500),
            beat(a, b, 500),
            beat(a, b, 500),
            beat(b, a, 500),
        ];

        let s = run(&ps, &games);
        assert_eq!(s.debts.len(), 1);
        let Some(debt) = s.debts.first() else {
            panic!("missing debt");
        };
        assert_eq!((debt.from, debt.to, debt.amount), (b, a, money(1000)));
    }

    #[test]
    fn zero_net_pair_emits_nothing() {
        let ps = players(2);
        let (a, b) = (id(&ps, 0), id(&ps, 1));
        let games = vec![beat(a, b, 500), beat(b, a, 500)];

        let s = run(&ps, &games);
        assert!(s.debts.is_empty());
        let Some(sa) = s.stats_for(a) else {
            panic!("missing stats");
        };
        assert_eq!(sa.total_games, 2);
        assert_eq!(sa.balance, Decimal::ZERO);
    }

    #[test]
    fn cycles_are_not_cancelled_across_pairs() {
        let ps = players(3);
        let (a, b, c) = (id(&ps, 0), id(&ps, 1), id(&ps, 2));
        // a owes b, b owes c, c owes a
        let games = vec![beat(b, a, 100), beat(c, b, 100), beat(a, c, 100)];

        let s = run(&ps, &games);
        assert_eq!(s.debts.len(), 3);
        let mut edges: Vec<(PlayerId, PlayerId)> = s.debts.iter().map(|d| (d.from, d.to)).collect();
        edges.sort();
        let mut expected = vec![(a, b), (b, c), (c, a)];
        expected.sort();
        assert_eq!(edges, expected);
        assert!(s.debts.iter().all(|d| d.amount == money(100)));
        for stats in &s.stats {
            assert_eq!(stats.balance, Decimal::ZERO);
        }
        assert!(s.verify_conservation().is_ok());
    }

    #[test]
    fn stats_fold_wins_losses_and_money() {
        let ps = players(3);
        let (a, b, c) = (id(&ps, 0), id(&ps, 1), id(&ps, 2));
        let games = vec![beat(a, b, 200), beat(a, c, 100), beat(c, a, 50)];

        let s = run(&ps, &games);
        let Some(sa) = s.stats_for(a) else {
            panic!("missing stats");
        };
        assert_eq!((sa.total_games, sa.wins, sa.losses), (3, 2, 1));
        assert_eq!(sa.total_won, money(300));
        assert_eq!(sa.total_lost, money(50));
        assert_eq!(sa.balance, money(250));
        assert_eq!(sa.win_rate, Decimal::new(667, 1));

        let Some(sb) = s.stats_for(b) else {
            panic!("missing stats");
        };
        assert_eq!(sb.balance, money(-200));
        assert_eq!(sb.win_rate, Decimal::ZERO);
    }

    #[test]
    fn fractional_stakes_stay_exact() {
        let ps = players(2);
        let (a, b) = (id(&ps, 0), id(&ps, 1));
        let dime = Decimal::new(10, 2);
        let games: Vec<Game> = (0..30).map(|_| finished_with(a, b, a, dime)).collect();

        let s = run(&ps, &games);
        let Some(debt) = s.debts.first() else {
            panic!("missing debt");
        };
        assert_eq!(debt.amount, Decimal::new(300, 2));
        assert_eq!(debt.amount.to_string(), "3.00");
    }

    #[test]
    fn active_games_do_not_count() {
        let ps = players(2);
        let (a, b) = (id(&ps, 0), id(&ps, 1));
        let Ok(stake) = Stake::new(money(999)) else {
            panic!("valid stake");
        };
        let Ok(active) = Game::new(a, b, a, stake) else {
            panic!("valid game");
        };

        let s = run(&ps, &[active, beat(a, b, 10)]);
        let Some(sa) = s.stats_for(a) else {
            panic!("missing stats");
        };
        assert_eq!(sa.total_games, 1);
        assert_eq!(s.debts.first().map(|d| d.amount), Some(money(10)));
    }

    #[test]
    fn malformed_game_fails_the_whole_settlement() {
        let ps = players(2);
        let (a, b) = (id(&ps, 0), id(&ps, 1));
        let mut broken = beat(a, b, 10);
        broken.winner = None;
        let result = settle(&ps, &[beat(b, a, 5), broken.clone()]);
        assert_eq!(
            result,
            Err(SettlementError::MissingWinner { game_id: broken.id })
        );
    }

    #[test]
    fn tampered_debt_breaks_conservation() {
        let ps = players(2);
        let (a, b) = (id(&ps, 0), id(&ps, 1));
        let mut s = run(&ps, &[beat(a, b, 10)]);
        if let Some(debt) = s.debts.first_mut() {
            debt.amount = money(11);
        }
        assert!(matches!(
            s.verify_conservation(),
            Err(SettlementError::ConservationViolated { .. })
        ));
    }

    #[test]
    fn debt_with_unknown_party_breaks_conservation() {
        let ps = players(1);
        let mut s = run(&ps, &[]);
        s.debts.push(Debt {
            from: PlayerId::new(),
            to: id(&ps, 0),
            amount: money(1),
        });
        assert!(s.verify_conservation().is_err());
    }

    #[test]
    fn recomputation_is_idempotent() {
        let ps = players(3);
        let (a, b, c) = (id(&ps, 0), id(&ps, 1), id(&ps, 2));
        let games = vec![beat(a, b, 10), beat(c, b, 20), beat(b, a, 5)];
        assert_eq!(run(&ps, &games), run(&ps, &games));
    }

    // ── Property tests ─────────────────────────────────────────────────

    /// (first player index, opponent offset, first player wins, stake cents)
    type RawGame = (usize, usize, bool, i64);

    fn history() -> impl Strategy<Value = (usize, Vec<RawGame>)> {
        (2usize..7).prop_flat_map(|n| {
            let game = (0..n, 1..n, any::<bool>(), 1i64..10_000_000);
            (Just(n), prop::collection::vec(game, 0..48))
        })
    }

    fn shuffled_history() -> impl Strategy<Value = (usize, Vec<RawGame>, Vec<usize>)> {
        history().prop_flat_map(|(n, raw)| {
            let order: Vec<usize> = (0..raw.len()).collect();
            (Just(n), Just(raw), Just(order).prop_shuffle())
        })
    }

    fn build(players: &[Player], raw: &[RawGame]) -> Vec<Game> {
        let n = players.len();
        raw.iter()
            .map(|&(i, offset, first_wins, cents)| {
                let p1 = id(players, i);
                let p2 = id(players, (i + offset) % n);
                let winner = if first_wins { p1 } else { p2 };
                finished_with(p1, p2, winner, Decimal::new(cents, 2))
            })
            .collect()
    }

    proptest! {
        #[test]
        fn debts_conserve_every_balance((n, raw) in history()) {
            let ps = players(n);
            let s = run(&ps, &build(&ps, &raw));
            prop_assert!(s.verify_conservation().is_ok());

            let Ok(positions) = s.debt_positions() else {
                panic!("positions overflowed");
            };
            for stats in &s.stats {
                let net = positions.get(&stats.player_id).copied().unwrap_or(Decimal::ZERO);
                prop_assert_eq!(net, stats.balance);
                prop_assert_eq!(stats.total_won - stats.total_lost, stats.balance);
                prop_assert_eq!(stats.wins + stats.losses, stats.total_games);
            }
        }

        #[test]
        fn debts_are_positive_and_unique_per_pair((n, raw) in history()) {
            let ps = players(n);
            let s = run(&ps, &build(&ps, &raw));
            let mut seen = std::collections::BTreeSet::new();
            for debt in &s.debts {
                prop_assert!(debt.amount > Decimal::ZERO);
                prop_assert_ne!(debt.from, debt.to);
                prop_assert!(seen.insert(fold::PairKey::new(debt.from, debt.to)));
            }
        }

        #[test]
        fn output_is_independent_of_game_order((n, raw, order) in shuffled_history()) {
            let ps = players(n);
            let games = build(&ps, &raw);
            let permuted: Vec<Game> = order.iter().filter_map(|&i| games.get(i).cloned()).collect();
            prop_assert_eq!(run(&ps, &games), run(&ps, &permuted));
        }

        #[test]
        fn output_is_independent_of_pair_orientation((n, raw) in history()) {
            let ps = players(n);
            let games = build(&ps, &raw);
            let flipped: Vec<Game> = games
                .iter()
                .cloned()
                .map(|mut g| {
                    std::mem::swap(&mut g.player1, &mut g.player2);
                    g
                })
                .collect();
            prop_assert_eq!(run(&ps, &games), run(&ps, &flipped));
        }

        #[test]
        fn balances_sum_to_zero((n, raw) in history()) {
            let ps = players(n);
            let s = run(&ps, &build(&ps, &raw));
            let total: Decimal = s.stats.iter().map(|st| st.balance).sum();
            prop_assert_eq!(total, Decimal::ZERO);
        }
    }
}
