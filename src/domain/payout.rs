//! Payout models.
//!
//! A market picks one model at creation. Both operate on the same ledger
//! shape and differ only in how a winning stake turns into a payout and in
//! how much liability a new wager adds before resolution.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::money::{truncate, Amount, Odds};

/// How winning stakes are paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutModel {
    /// Stake times the odds locked at placement.
    #[default]
    FixedOdds,
    /// Proportional share of the pool after the fee.
    Parimutuel,
}

/// Pool totals a parimutuel payout is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolShare {
    /// Total staked on the market.
    pub total_pool: Amount,
    /// Total staked on the winning outcome.
    pub winning_pool: Amount,
    /// Fee frozen at resolution.
    pub fee: Amount,
}

impl PoolShare {
    /// Pool left for winners once the fee is set aside.
    #[must_use]
    pub fn distributable(&self) -> Amount {
        (self.total_pool - self.fee).max(Decimal::ZERO)
    }
}

impl PayoutModel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FixedOdds => "fixed_odds",
            Self::Parimutuel => "parimutuel",
        }
    }

    /// Whether a wager needs active odds on its outcome.
    #[must_use]
    pub const fn requires_odds(self) -> bool {
        matches!(self, Self::FixedOdds)
    }

    /// Whether admission must also cover the fee owed on the pool.
    ///
    /// Parimutuel fees come out of the pool itself, so the stake already
    /// backs them.
    #[must_use]
    pub const fn reserves_fee(self) -> bool {
        matches!(self, Self::FixedOdds)
    }

    /// Liability a new wager adds to the market.
    #[must_use]
    pub fn placement_liability(self, stake: Amount, odds: Option<Odds>) -> Amount {
        match (self, odds) {
            (Self::FixedOdds, Some(odds)) => odds.apply(stake),
            _ => stake,
        }
    }

    /// [`PayoutModel::placement_liability`], or `None` on overflow.
    #[must_use]
    pub fn checked_placement_liability(
        self,
        stake: Amount,
        odds: Option<Odds>,
    ) -> Option<Amount> {
        match (self, odds) {
            (Self::FixedOdds, Some(odds)) => odds.checked_apply(stake),
            _ => Some(stake),
        }
    }

    /// Payout of a winning stake.
    #[must_use]
    pub fn payout(self, stake: Amount, odds: Option<Odds>, pool: &PoolShare) -> Amount {
        match (self, odds) {
            (Self::FixedOdds, Some(odds)) => odds.apply(stake),
            (Self::FixedOdds, None) => stake,
            (Self::Parimutuel, _) => {
                if pool.winning_pool.is_zero() {
                    return Decimal::ZERO;
                }
                let distributable = pool.distributable();
                let share = stake.checked_mul(distributable).map_or_else(
                    || distributable * (stake / pool.winning_pool),
                    |product| product / pool.winning_pool,
                );
                truncate(share)
            }
        }
    }
}

impl fmt::Display for PayoutModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoutModel {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "fixed_odds" | "fixed" => Ok(Self::FixedOdds),
            "parimutuel" | "pari" => Ok(Self::Parimutuel),
            other => Err(LedgerError::invalid(
                "model",
                format!("unknown payout model '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn odds(raw: u32) -> Odds {
        Odds::try_new(raw).unwrap()
    }

    #[test]
    fn fixed_odds_pays_stake_times_odds() {
        let pool = PoolShare {
            total_pool: dec!(0),
            winning_pool: dec!(0),
            fee: dec!(0),
        };
        assert_eq!(
            PayoutModel::FixedOdds.payout(dec!(100), Some(odds(25_000)), &pool),
            dec!(250)
        );
        assert_eq!(
            PayoutModel::FixedOdds.placement_liability(dec!(100), Some(odds(18_000))),
            dec!(180)
        );
    }

    #[test]
    fn parimutuel_shares_distributable_pool() {
        let pool = PoolShare {
            total_pool: dec!(1000),
            winning_pool: dec!(300),
            fee: dec!(50),
        };
        assert_eq!(
            PayoutModel::Parimutuel.payout(dec!(100), None, &pool),
            dec!(316.66666666)
        );
        assert_eq!(
            PayoutModel::Parimutuel.payout(dec!(200), None, &pool),
            dec!(633.33333333)
        );
    }

    #[test]
    fn parimutuel_liability_is_stake() {
        assert_eq!(
            PayoutModel::Parimutuel.placement_liability(dec!(40), Some(odds(30_000))),
            dec!(40)
        );
    }

    #[test]
    fn parimutuel_with_empty_winning_pool_pays_nothing() {
        let pool = PoolShare {
            total_pool: dec!(10),
            winning_pool: dec!(0),
            fee: dec!(0),
        };
        assert_eq!(PayoutModel::Parimutuel.payout(dec!(1), None, &pool), dec!(0));
    }

    #[test]
    fn parses_model_names() {
        assert_eq!("fixed-odds".parse::<PayoutModel>().unwrap(), PayoutModel::FixedOdds);
        assert_eq!("parimutuel".parse::<PayoutModel>().unwrap(), PayoutModel::Parimutuel);
        assert!("tote".parse::<PayoutModel>().is_err());
    }
}
