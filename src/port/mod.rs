//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! The ledger engine talks to the outside world only through these traits,
//! each injected as an `Arc<dyn _>`.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      LedgerEngine       │
//!     ┌──────────────┤    Domain + Port        ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     │                  │               │                    │
//!     ▼                  ▼               ▼                    ▼
//! ┌─────────┐     ┌────────────┐   ┌──────────┐        ┌───────────┐
//! │ Access  │     │ Settlement │   │  Store   │        │ Notifier  │
//! │ Policy  │     │   Assets   │   │ Adapter  │        │  Adapter  │
//! └─────────┘     └────────────┘   └──────────┘        └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`AccessPolicy`] - Capability check before privileged actions
//! - [`SettlementAssets`] - Inbound stakes and outbound payouts
//! - [`LedgerStore`] - Durable market state
//! - [`Notifier`] - Ledger events
//! - [`Clock`] - Time source for cutoffs and timestamps

pub mod outbound;

pub use outbound::access::AccessPolicy;
pub use outbound::assets::{SettlementAssets, TransferError};
pub use outbound::clock::Clock;
pub use outbound::notifier::{LedgerEvent, Notifier, NotifierRegistry, NullNotifier};
pub use outbound::store::LedgerStore;
