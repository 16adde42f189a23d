//! Notifier port for ledger events.
//!
//! Every successful state change on the ledger emits one [`LedgerEvent`]
//! after it has been persisted and its transfers executed.

use serde::Serialize;

use crate::domain::{
    AccountId, Amount, AssetId, MarketId, MarketState, OddsIndex, PayoutModel, Quote,
};

/// Events emitted by the ledger engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A market was created.
    MarketCreated {
        market_id: MarketId,
        asset: AssetId,
        model: PayoutModel,
        outcome_count: u8,
    },
    /// An outcome's active odds moved.
    OddsChanged {
        market_id: MarketId,
        outcome: u8,
        index: OddsIndex,
        quote: Quote,
        /// Whether the quote was new to the registry.
        appended: bool,
    },
    /// A lifecycle transition.
    MarketStateChanged {
        market_id: MarketId,
        from: MarketState,
        to: MarketState,
    },
    /// A wager was accepted.
    BetPlaced(BetEvent),
    /// A market was resolved.
    MarketResolved {
        market_id: MarketId,
        winning_outcome: u8,
        fee: Amount,
        winning_pool: Amount,
    },
    /// Winnings were paid.
    Claimed {
        market_id: MarketId,
        owner: AccountId,
        bet_indices: Vec<usize>,
        amount: Amount,
        /// Fee charged alongside; non-zero on the market's first claim.
        fee: Amount,
    },
    /// A stake was returned from a cancelled market.
    Refunded {
        market_id: MarketId,
        owner: AccountId,
        bet_index: usize,
        amount: Amount,
    },
    /// A market's reserve went to the fee recipient because nobody won.
    Swept {
        market_id: MarketId,
        recipient: AccountId,
        amount: Amount,
    },
    /// Operator funds added to a reserve.
    ReserveFunded {
        market_id: MarketId,
        account: AccountId,
        amount: Amount,
    },
    /// Surplus reserve withdrawn.
    ReserveWithdrawn {
        market_id: MarketId,
        account: AccountId,
        amount: Amount,
    },
    /// The pause switch flipped.
    PauseChanged { paused: bool, by: AccountId },
}

/// Wager placement event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetEvent {
    pub market_id: MarketId,
    pub owner: AccountId,
    pub bet_index: usize,
    pub outcome: u8,
    pub stake: Amount,
    pub odds_index: Option<OddsIndex>,
    pub quote: Option<Quote>,
}

impl LedgerEvent {
    /// Market the event concerns, if any.
    #[must_use]
    pub fn market_id(&self) -> Option<&MarketId> {
        match self {
            Self::MarketCreated { market_id, .. }
            | Self::OddsChanged { market_id, .. }
            | Self::MarketStateChanged { market_id, .. }
            | Self::MarketResolved { market_id, .. }
            | Self::Claimed { market_id, .. }
            | Self::Refunded { market_id, .. }
            | Self::Swept { market_id, .. }
            | Self::ReserveFunded { market_id, .. }
            | Self::ReserveWithdrawn { market_id, .. } => Some(market_id),
            Self::BetPlaced(e) => Some(&e.market_id),
            Self::PauseChanged { .. } => None,
        }
    }

    /// Short stable name, e.g. `bet_placed`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MarketCreated { .. } => "market_created",
            Self::OddsChanged { .. } => "odds_changed",
            Self::MarketStateChanged { .. } => "market_state_changed",
            Self::BetPlaced(_) => "bet_placed",
            Self::MarketResolved { .. } => "market_resolved",
            Self::Claimed { .. } => "claimed",
            Self::Refunded { .. } => "refunded",
            Self::Swept { .. } => "swept",
            Self::ReserveFunded { .. } => "reserve_funded",
            Self::ReserveWithdrawn { .. } => "reserve_withdrawn",
            Self::PauseChanged { .. } => "pause_changed",
        }
    }
}

/// Trait for event handlers.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - `notify` runs while the engine holds its ledger lock and should return
///   quickly
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: &LedgerEvent);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
#[derive(Default)]
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Notifier for NotifierRegistry {
    fn notify(&self, event: &LedgerEvent) {
        for notifier in &self.notifiers {
            notifier.notify(event);
        }
    }
}

/// A no-op notifier for when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: &LedgerEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Counting(Arc<Mutex<Vec<&'static str>>>);

    impl Notifier for Counting {
        fn notify(&self, event: &LedgerEvent) {
            self.0.lock().push(event.name());
        }
    }

    #[test]
    fn registry_broadcasts_to_all() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(Counting(seen.clone())));
        registry.register(Box::new(Counting(seen.clone())));
        assert_eq!(registry.len(), 2);

        registry.notify(&LedgerEvent::PauseChanged {
            paused: true,
            by: AccountId::new("admin"),
        });
        assert_eq!(*seen.lock(), vec!["pause_changed", "pause_changed"]);
    }

    #[test]
    fn pause_event_has_no_market() {
        let event = LedgerEvent::PauseChanged {
            paused: false,
            by: AccountId::new("admin"),
        };
        assert!(event.market_id().is_none());
    }
}
