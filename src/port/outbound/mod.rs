//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe what the ledger needs from its surroundings:
//! authority checks, fund movement, storage, notifications and time.

pub mod access;
pub mod assets;
pub mod clock;
pub mod notifier;
pub mod store;
