//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`engine`]: `EngineHarness` wiring a [`LedgerEngine`](crate::application::LedgerEngine)
//!   to in-memory adapters, plus market builders.
//! - [`assets`]: settlement adapters that fail on demand or call back into
//!   the engine.
//! - [`notifier`]: `RecordingNotifier` capturing emitted events.
//! - [`clock`]: `ManualClock` for cutoff tests.
//! - [`access`]: blanket allow/deny policies.

pub mod access;
pub mod assets;
pub mod clock;
pub mod engine;
pub mod notifier;
