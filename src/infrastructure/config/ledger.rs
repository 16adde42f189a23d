//! Ledger-wide defaults.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::LedgerSettings;
use crate::domain::AccountId;

/// The `[ledger]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Fee applied to markets created without an explicit fee.
    pub fee_bps: u16,
    /// Account credited with fees and swept reserves.
    pub fee_recipient: String,
    /// Minimum stake applied to markets created without an explicit one.
    pub min_stake: Decimal,
    /// Start with wagering and claims paused.
    pub paused: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            fee_bps: 0,
            fee_recipient: "treasury".into(),
            min_stake: Decimal::ZERO,
            paused: false,
        }
    }
}

impl LedgerConfig {
    /// Engine settings derived from this section.
    #[must_use]
    pub fn settings(&self) -> LedgerSettings {
        LedgerSettings {
            fee_recipient: AccountId::new(self.fee_recipient.clone()),
            paused: self.paused,
        }
    }
}
