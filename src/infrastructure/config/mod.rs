//! Infrastructure configuration modules.

pub mod ledger;
pub mod logging;
pub mod roles;
pub mod settings;
