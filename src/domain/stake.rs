//! Wager amount committed when a game is created.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::LedgerError;

/// Number of fractional digits a stake may carry.
pub const STAKE_SCALE: u32 = 2;

/// Largest accepted stake (`99_999_999.99`), matching a `NUMERIC(10,2)`
/// column. The 96-bit mantissa `9_999_999_999` is split into `lo`/`mid`.
pub const MAX_STAKE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, STAKE_SCALE);

/// A strictly positive monetary amount with exactly two decimal places.
///
/// Stakes are exact decimals; binary floating point never touches money.
/// Serializes as a decimal string (`"500.00"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "500.00")]
pub struct Stake(Decimal);

impl Stake {
    /// Validates and normalises a stake to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidStake`] if the amount is not positive,
    /// has more than two significant fractional digits, or exceeds
    /// [`MAX_STAKE`].
    pub fn new(amount: Decimal) -> Result<Self, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidStake(format!(
                "stake must be positive, got {amount}"
            )));
        }
        if amount.normalize().scale() > STAKE_SCALE {
            return Err(LedgerError::InvalidStake(format!(
                "stake must have at most {STAKE_SCALE} decimal places, got {amount}"
            )));
        }
        if amount > MAX_STAKE {
            return Err(LedgerError::InvalidStake(format!(
                "stake must not exceed {MAX_STAKE}, got {amount}"
            )));
        }
        let mut amount = amount;
        amount.rescale(STAKE_SCALE);
        Ok(Self(amount))
    }

    /// Returns the stake as a [`Decimal`].
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Stake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Stake {
    type Error = LedgerError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Stake> for Decimal {
    fn from(stake: Stake) -> Self {
        stake.0
    }
}
