//! Oddsledger - fixed-odds wagering ledger.
//!
//! Markets take wagers on one of several outcomes. A bet locks in the odds
//! active on its outcome when placed by storing an index into that outcome's
//! append-only, deduplicated odds registry. Every market carries a reserve
//! that must cover the worst-case payout, and settlement pays winners exactly
//! once, charges the fee once, and refunds stakes of cancelled markets.
//!
//! # Architecture
//!
//! - **`domain`** - Pure ledger state and transitions
//!   - `OddsRegistry` - Deduplicated quote history per outcome
//!   - `MarketBook` - Market, registries, bets and solvency of one market
//!   - `PayoutModel` - Fixed-odds and parimutuel payout rules
//!
//! - **`port`** - Traits the engine depends on (access, assets, store,
//!   notifier, clock)
//! - **`application`** - `LedgerEngine`, which serializes operations, moves
//!   funds and rolls back on failure
//! - **`adapter`** - In-memory and SQLite implementations of the ports, and
//!   the command-line interface
//! - **`infrastructure`** - Configuration and runtime wiring
//!
//! # Example
//!
//! ```no_run
//! use oddsledger::infrastructure::bootstrap::build_runtime;
//! use oddsledger::infrastructure::config::settings::Config;
//!
//! let config = Config::load("oddsledger.toml")?;
//! let runtime = build_runtime(&config)?;
//! println!("{} markets", runtime.engine.markets().len());
//! # Ok::<(), oddsledger::error::Error>(())
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
