//! SQLite persistence adapters.
//!
//! - [`SqliteLedgerStore`]: market books (markets, odds registries, bets)
//! - [`TransferJournal`]: settlement transfers recorded as journal rows

pub mod database;
pub mod journal;
pub mod store;

pub use journal::{JournalEntry, TransferJournal};
pub use store::SqliteLedgerStore;
