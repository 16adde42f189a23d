//! Reserve and liability accounting for a market.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::id::AssetId;
use super::money::Amount;

/// Reserve backing a market and the payouts it may still owe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solvency {
    pub reserve_balance: Amount,
    pub outstanding_liability: Amount,
}

impl Solvency {
    #[must_use]
    pub const fn new(reserve_balance: Amount, outstanding_liability: Amount) -> Self {
        Self {
            reserve_balance,
            outstanding_liability,
        }
    }

    /// Admit a wager bringing `stake` into the reserve and adding
    /// `liability`, with `fee_term` set aside for the pending fee.
    ///
    /// # Errors
    /// Returns [`LedgerError::InsufficientReserve`] if the reserve after the
    /// stake would not cover every liability plus `fee_term`, or
    /// [`LedgerError::InvalidParam`] if the sums overflow.
    pub fn check_admission(
        &self,
        stake: Amount,
        liability: Amount,
        fee_term: Amount,
    ) -> Result<(), LedgerError> {
        let overflow = || LedgerError::invalid("stake", "too large for the market's reserve");
        let available = self
            .reserve_balance
            .checked_add(stake)
            .ok_or_else(overflow)?;
        let required = self
            .outstanding_liability
            .checked_add(liability)
            .and_then(|sum| sum.checked_add(fee_term))
            .ok_or_else(overflow)?;
        if available < required {
            return Err(LedgerError::InsufficientReserve {
                required,
                available,
            });
        }
        Ok(())
    }

    /// Record an admitted wager.
    pub fn admit(&mut self, stake: Amount, liability: Amount) {
        self.reserve_balance += stake;
        self.outstanding_liability += liability;
    }

    /// Pay `amount` out of the reserve, settling `liability`.
    ///
    /// # Errors
    /// Returns [`LedgerError::InsufficientReserve`] if the reserve cannot
    /// cover `amount`.
    pub fn pay(&mut self, amount: Amount, liability: Amount) -> Result<(), LedgerError> {
        if self.reserve_balance < amount {
            return Err(LedgerError::InsufficientReserve {
                required: amount,
                available: self.reserve_balance,
            });
        }
        self.reserve_balance -= amount;
        self.outstanding_liability = (self.outstanding_liability - liability).max(Decimal::ZERO);
        Ok(())
    }

    /// Reserve above `committed`.
    #[must_use]
    pub fn surplus(&self, committed: Amount) -> Amount {
        (self.reserve_balance - committed).max(Decimal::ZERO)
    }
}

/// Read-only solvency figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolvencyView {
    pub asset: AssetId,
    pub reserve_balance: Amount,
    pub outstanding_liability: Amount,
    pub total_pool: Amount,
}

impl SolvencyView {
    /// An all-zero view for `asset`.
    #[must_use]
    pub fn empty(asset: AssetId) -> Self {
        Self {
            asset,
            reserve_balance: Decimal::ZERO,
            outstanding_liability: Decimal::ZERO,
            total_pool: Decimal::ZERO,
        }
    }

    /// Add another market's figures.
    pub fn absorb(&mut self, other: &Self) {
        self.reserve_balance += other.reserve_balance;
        self.outstanding_liability += other.outstanding_liability;
        self.total_pool += other.total_pool;
    }

    #[must_use]
    pub fn is_covered(&self) -> bool {
        self.reserve_balance >= self.outstanding_liability
    }
}
