//! Pairwise debt netting.
//!
//! Each unordered pair of players collapses into at most one directed
//! debt. Netting never crosses pairs: a cycle `A -> B -> C -> A` stays as
//! three debts. Graph-wide minimisation, if ever wanted, belongs in a
//! separate transform on top of this output.

use rust_decimal::Decimal;
use serde::Serialize;

use super::fold::Fold;
use crate::domain::PlayerId;

/// `from` owes `to` exactly `amount`. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Debt {
    /// Debtor.
    pub from: PlayerId,
    /// Creditor.
    pub to: PlayerId,
    /// Strictly positive amount owed.
    pub amount: Decimal,
}

/// Turns the pair flows of a fold into directed debts.
///
/// Pairs netting to zero emit nothing. The output is ordered by canonical
/// pair, so it is stable across calls on the same ledger.
#[must_use]
pub fn net_pairs(fold: &Fold) -> Vec<Debt> {
    fold.flows()
        .filter_map(|(pair, net)| {
            if net > Decimal::ZERO {
                Some(Debt {
                    from: pair.high(),
                    to: pair.low(),
                    amount: net,
                })
            } else if net < Decimal::ZERO {
                Some(Debt {
                    from: pair.low(),
                    to: pair.high(),
                    amount: -net,
                })
            } else {
                None
            }
        })
        .collect()
}
