//! Pure ledger logic: markets, odds, bets, solvency and payouts.
//!
//! Nothing in here performs I/O. Operations that move funds describe the
//! movement as [`Transfer`]s and leave execution to the application layer.

pub mod access;
pub mod bet;
pub mod book;
pub mod error;
pub mod id;
pub mod market;
pub mod money;
pub mod odds;
pub mod payout;
pub mod solvency;
pub mod transfer;

// Core domain types
pub use access::Action;
pub use bet::{Bet, BetLedger};
pub use book::{BetView, MarketBook, Payout, Placement, Refund, ReserveMove, Resolution};
pub use error::{ErrorKind, LedgerError};
pub use id::{AccountId, AssetId, MarketId};
pub use market::{Market, MarketState, NewMarket, MAX_OUTCOMES, MIN_OUTCOMES};
pub use money::{Amount, Line, Odds};
pub use odds::{OddsIndex, OddsRegistry, OddsUpdate, Quote};
pub use payout::PayoutModel;
pub use solvency::{Solvency, SolvencyView};
pub use transfer::{Settlement, Transfer};
