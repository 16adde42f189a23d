//! Privileged actions checked against the access policy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An operator action that requires authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create a market.
    CreateMarket,
    /// Open, suspend, resume, close or cancel a market.
    ManageMarket,
    /// Move a market's odds.
    SetOdds,
    /// Declare the winning outcome.
    Resolve,
    /// Pause switch, reserve funding and withdrawal, sweeps.
    Administer,
}

impl Action {
    /// Human-readable verb phrase used in errors and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateMarket => "create markets",
            Self::ManageMarket => "manage markets",
            Self::SetOdds => "set odds",
            Self::Resolve => "resolve markets",
            Self::Administer => "administer the ledger",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
