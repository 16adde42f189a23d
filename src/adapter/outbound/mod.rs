//! Outbound adapters (driven side).

pub mod access;
pub mod clock;
pub mod memory;
pub mod notifier;
pub mod sqlite;
pub mod vault;
