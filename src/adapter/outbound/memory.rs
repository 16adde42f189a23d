//! In-memory ledger store.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::domain::{MarketBook, MarketId};
use crate::error::Result;
use crate::port::outbound::store::LedgerStore;

/// Store that keeps market books in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    markets: RwLock<BTreeMap<MarketId, MarketBook>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored copy of one market.
    #[must_use]
    pub fn get(&self, market_id: &MarketId) -> Option<MarketBook> {
        self.markets.read().get(market_id).cloned()
    }

    /// Number of stored markets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markets.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markets.read().is_empty()
    }
}

impl LedgerStore for MemoryStore {
    fn save_market(&self, book: &MarketBook) -> Result<()> {
        self.markets.write().insert(book.id().clone(), book.clone());
        Ok(())
    }

    fn load_markets(&self) -> Result<Vec<MarketBook>> {
        Ok(self.markets.read().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewMarket, Odds};
    use chrono::Utc;

    fn book(id: &str) -> MarketBook {
        let odds = Odds::try_new(20_000).unwrap();
        let spec = NewMarket::fixed_odds(id, "USDC", vec![odds, odds]);
        MarketBook::create(&spec, Utc::now()).unwrap()
    }

    #[test]
    fn save_replaces_existing() {
        let store = MemoryStore::new();
        let mut b = book("m1");
        store.save_market(&b).unwrap();
        b.open().unwrap();
        store.save_market(&b).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&MarketId::new("m1")), Some(b));
    }

    #[test]
    fn load_returns_all_markets() {
        let store = MemoryStore::new();
        store.save_market(&book("a")).unwrap();
        store.save_market(&book("b")).unwrap();
        let ids: Vec<_> = store
            .load_markets()
            .unwrap()
            .iter()
            .map(|b| b.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
