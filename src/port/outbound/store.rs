//! Persistence port for market books.

use crate::domain::MarketBook;
use crate::error::Result;

/// Durable storage of every market's full state.
///
/// Bets and odds history are the ledger's audit trail, so a save writes the
/// whole book and must be atomic.
pub trait LedgerStore: Send + Sync {
    /// Insert or replace a market and everything it owns.
    fn save_market(&self, book: &MarketBook) -> Result<()>;

    /// Load every stored market.
    fn load_markets(&self) -> Result<Vec<MarketBook>>;
}
