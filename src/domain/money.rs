//! Monetary and odds types.
//!
//! Stakes, reserves and payouts are [`Amount`]s (`Decimal`). Odds are a
//! fixed-point multiplier with four decimals, so `20000` is `2.0000x`.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Monetary amount in a settlement asset.
pub type Amount = Decimal;

/// Fixed-point scale of [`Odds`].
pub const ODDS_SCALE: u32 = 10_000;

/// Smallest accepted odds value (1.0001x).
pub const MIN_ODDS: u32 = 10_001;

/// Largest accepted odds value (100.00x).
pub const MAX_ODDS: u32 = 1_000_000;

/// Basis points in one whole.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Highest fee a market may charge (10%).
pub const MAX_FEE_BPS: u16 = 1_000;

/// Decimal places kept on computed payouts and fees; the rest is truncated.
pub const PAYOUT_DECIMALS: u32 = 8;

/// Truncate a computed amount to [`PAYOUT_DECIMALS`], never rounding up.
#[must_use]
pub fn truncate(amount: Amount) -> Amount {
    amount.round_dp_with_strategy(PAYOUT_DECIMALS, RoundingStrategy::ToZero)
}

/// `amount * bps / 10000`, truncated.
#[must_use]
pub fn bps_of(amount: Amount, bps: u16) -> Amount {
    truncate(amount * (Decimal::from(bps) / Decimal::from(BPS_DENOMINATOR)))
}

/// Fixed-point odds multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Odds(u32);

impl Odds {
    /// Validate a raw fixed-point value against [`MIN_ODDS`]..=[`MAX_ODDS`].
    ///
    /// # Errors
    /// Returns [`LedgerError::OddsOutOfRange`] outside the accepted bounds.
    pub fn try_new(raw: u32) -> Result<Self, LedgerError> {
        if raw < MIN_ODDS || raw > MAX_ODDS {
            return Err(LedgerError::OddsOutOfRange { value: raw });
        }
        Ok(Self(raw))
    }

    /// Raw fixed-point value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The odds as a decimal multiplier (`20000` -> `2.0000`).
    #[must_use]
    pub fn multiplier(self) -> Decimal {
        Decimal::new(i64::from(self.0), 4)
    }

    /// Payout of `stake` at these odds.
    #[must_use]
    pub fn apply(self, stake: Amount) -> Amount {
        truncate(stake * self.multiplier())
    }

    /// [`Odds::apply`], or `None` when the payout does not fit an [`Amount`].
    #[must_use]
    pub fn checked_apply(self, stake: Amount) -> Option<Amount> {
        stake.checked_mul(self.multiplier()).map(truncate)
    }
}

impl TryFrom<u32> for Odds {
    type Error = LedgerError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::try_new(raw)
    }
}

impl From<Odds> for u32 {
    fn from(odds: Odds) -> Self {
        odds.0
    }
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

impl FromStr for Odds {
    type Err = LedgerError;

    /// Parse a decimal multiplier such as `2.5` or `1.8000`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidParam {
            field: "odds",
            reason: format!("'{s}' is not a multiplier with at most 4 decimals"),
        };
        let multiplier = Decimal::from_str(s.trim().trim_end_matches('x')).map_err(|_| invalid())?;
        let scaled = multiplier * Decimal::from(ODDS_SCALE);
        if !scaled.fract().is_zero() {
            return Err(invalid());
        }
        let raw = scaled.to_u32().ok_or_else(invalid)?;
        Self::try_new(raw)
    }
}

/// Handicap line in hundredths (`-150` is a -1.5 line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Line(i32);

impl Line {
    /// Create a line from hundredths.
    #[must_use]
    pub const fn new(hundredths: i32) -> Self {
        Self(hundredths)
    }

    /// Raw value in hundredths.
    #[must_use]
    pub const fn hundredths(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = Decimal::new(i64::from(self.0), 2).normalize();
        if self.0 > 0 {
            write!(f, "+{value}")
        } else {
            write!(f, "{value}")
        }
    }
}

impl FromStr for Line {
    type Err = LedgerError;

    /// Parse a decimal line such as `-1.5` or `+2.25`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidParam {
            field: "line",
            reason: format!("'{s}' is not a line with at most 2 decimals"),
        };
        let value = Decimal::from_str(s.trim().trim_start_matches('+')).map_err(|_| invalid())?;
        let scaled = value * Decimal::ONE_HUNDRED;
        if !scaled.fract().is_zero() {
            return Err(invalid());
        }
        scaled.to_i32().map(Self).ok_or_else(invalid)
    }
}
