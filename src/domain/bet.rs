//! Wagers and the per-market bet ledger.
//!
//! Bets are appended in placement order per owner and never merged or
//! removed; a bet's position in its owner's list is its `bet_index`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{AccountId, AssetId};
use super::money::Amount;
use super::odds::OddsIndex;

/// A single wager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub owner: AccountId,
    pub outcome: u8,
    pub stake: Amount,
    /// Quote in force on the outcome's registry when placed.
    pub odds_index: Option<OddsIndex>,
    pub placed_at: DateTime<Utc>,
    pub claimed: bool,
    pub asset: AssetId,
}

/// All bets on one market, grouped by owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BetLedger {
    by_owner: BTreeMap<AccountId, Vec<Bet>>,
}

impl BetLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bet and return its index in the owner's list.
    pub fn append(&mut self, bet: Bet) -> usize {
        let bets = self.by_owner.entry(bet.owner.clone()).or_default();
        bets.push(bet);
        bets.len() - 1
    }

    /// The owner's bets in placement order.
    #[must_use]
    pub fn bets(&self, owner: &AccountId) -> &[Bet] {
        self.by_owner.get(owner).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn bet(&self, owner: &AccountId, index: usize) -> Option<&Bet> {
        self.by_owner.get(owner).and_then(|bets| bets.get(index))
    }

    pub(crate) fn bet_mut(&mut self, owner: &AccountId, index: usize) -> Option<&mut Bet> {
        self.by_owner.get_mut(owner).and_then(|bets| bets.get_mut(index))
    }

    /// Every bet as `(bet_index, bet)`, owners in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Bet)> {
        self.by_owner
            .values()
            .flat_map(|bets| bets.iter().enumerate())
    }

    /// Owners with at least one bet.
    pub fn owners(&self) -> impl Iterator<Item = &AccountId> {
        self.by_owner.keys()
    }

    /// Total number of bets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_owner.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_owner.is_empty()
    }
}
