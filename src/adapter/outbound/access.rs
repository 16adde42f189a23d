//! Role-based access policy.

use std::collections::HashSet;

use crate::domain::{AccountId, Action};
use crate::port::outbound::access::AccessPolicy;

/// Account lists per role.
///
/// Administrators may do everything. Market makers create and manage
/// markets, odds setters move odds, resolvers declare outcomes.
#[derive(Debug, Clone, Default)]
pub struct RoleAccessPolicy {
    administrators: HashSet<AccountId>,
    market_makers: HashSet<AccountId>,
    odds_setters: HashSet<AccountId>,
    resolvers: HashSet<AccountId>,
}

impl RoleAccessPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_administrators<I, A>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AccountId>,
    {
        self.administrators.extend(accounts.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_market_makers<I, A>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AccountId>,
    {
        self.market_makers.extend(accounts.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_odds_setters<I, A>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AccountId>,
    {
        self.odds_setters.extend(accounts.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_resolvers<I, A>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AccountId>,
    {
        self.resolvers.extend(accounts.into_iter().map(Into::into));
        self
    }
}

impl AccessPolicy for RoleAccessPolicy {
    fn can(&self, caller: &AccountId, action: Action) -> bool {
        if self.administrators.contains(caller) {
            return true;
        }
        match action {
            Action::CreateMarket | Action::ManageMarket => self.market_makers.contains(caller),
            Action::SetOdds => {
                self.odds_setters.contains(caller) || self.market_makers.contains(caller)
            }
            Action::Resolve => self.resolvers.contains(caller),
            Action::Administer => false,
        }
    }
}
