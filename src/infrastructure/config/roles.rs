//! Role assignments for the access policy.

use serde::Deserialize;

use crate::adapter::outbound::access::RoleAccessPolicy;
use crate::domain::AccountId;

/// The `[roles]` section. Each list names accounts holding that role.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    pub administrators: Vec<String>,
    pub market_makers: Vec<String>,
    pub odds_setters: Vec<String>,
    pub resolvers: Vec<String>,
}

impl RolesConfig {
    /// Build the access policy these roles describe.
    #[must_use]
    pub fn policy(&self) -> RoleAccessPolicy {
        RoleAccessPolicy::new()
            .with_administrators(accounts(&self.administrators))
            .with_market_makers(accounts(&self.market_makers))
            .with_odds_setters(accounts(&self.odds_setters))
            .with_resolvers(accounts(&self.resolvers))
    }

    /// Every account named in any role.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.administrators
            .iter()
            .chain(&self.market_makers)
            .chain(&self.odds_setters)
            .chain(&self.resolvers)
            .map(String::as_str)
    }
}

fn accounts(names: &[String]) -> impl Iterator<Item = AccountId> + '_ {
    names.iter().map(|name| AccountId::new(name.as_str()))
}
