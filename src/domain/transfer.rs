//! Fund movements requested by ledger operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::AccountId;
use super::money::Amount;

/// A single movement of the settlement asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "direction", rename_all = "snake_case")]
pub enum Transfer {
    /// Pull funds from an account into the ledger.
    Receive { from: AccountId, amount: Amount },
    /// Pay funds from the ledger to an account.
    Release { to: AccountId, amount: Amount },
}

impl Transfer {
    /// Counterparty account.
    #[must_use]
    pub fn account(&self) -> &AccountId {
        match self {
            Self::Receive { from, .. } => from,
            Self::Release { to, .. } => to,
        }
    }

    #[must_use]
    pub const fn amount(&self) -> Amount {
        match self {
            Self::Receive { amount, .. } | Self::Release { amount, .. } => *amount,
        }
    }

    /// `"in"` or `"out"` from the ledger's side.
    #[must_use]
    pub const fn direction(&self) -> &'static str {
        match self {
            Self::Receive { .. } => "in",
            Self::Release { .. } => "out",
        }
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Receive { from, amount } => write!(f, "receive {amount} from {from}"),
            Self::Release { to, amount } => write!(f, "release {amount} to {to}"),
        }
    }
}

/// Outcome of a ledger operation that may move funds.
pub trait Settlement {
    /// Transfers to execute once bookkeeping is committed.
    fn transfers(&self) -> &[Transfer] {
        &[]
    }
}

impl Settlement for () {}

/// Drop zero-amount movements.
pub(crate) fn non_zero(transfers: impl IntoIterator<Item = Transfer>) -> Vec<Transfer> {
    transfers
        .into_iter()
        .filter(|transfer| !transfer.amount().is_zero())
        .collect()
}
