//! Application services (use cases).
//!
//! The ledger engine orchestrates domain transitions and coordinates the
//! outbound ports around them.

pub mod engine;

pub use engine::{EnginePorts, LedgerEngine, LedgerSettings};
