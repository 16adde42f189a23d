//! Serialized ledger engine.
//!
//! Every operation runs under one global reentrant lock, so operations are
//! applied in a strict order across threads. A mutating operation:
//!
//! 1. checks authority and the pause switch,
//! 2. marks its market as in flight (a second entry on the same market
//!    fails with [`LedgerError::Reentrant`]),
//! 3. applies the pure [`MarketBook`] transition to a snapshot-protected
//!    book and persists it,
//! 4. releases the ledger borrow and executes the resulting transfers,
//! 5. on transfer failure restores and re-persists the snapshot,
//! 6. otherwise emits its event.
//!
//! Because bookkeeping is committed before step 4, an adapter calling back
//! into the engine sees the post-operation state (for example a bet already
//! marked claimed).

use std::cell::{RefCell, RefMut};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, error, info, warn};

use crate::domain::{
    AccountId, Action, Amount, AssetId, BetView, LedgerError, Line, Market, MarketBook, MarketId,
    MarketState, NewMarket, Odds, OddsUpdate, Payout, Placement, Quote, Refund, ReserveMove,
    Resolution, Settlement, SolvencyView,
};
use crate::error::{Error, Result};
use crate::port::outbound::notifier::BetEvent;
use crate::port::{AccessPolicy, Clock, LedgerEvent, LedgerStore, Notifier, SettlementAssets};

/// Ledger-wide settings.
#[derive(Debug, Clone)]
pub struct LedgerSettings {
    /// Account that receives fees and swept reserves.
    pub fee_recipient: AccountId,
    /// Initial state of the pause switch.
    pub paused: bool,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            fee_recipient: AccountId::new("treasury"),
            paused: false,
        }
    }
}

/// Collaborators the engine depends on.
#[derive(Clone)]
pub struct EnginePorts {
    pub access: Arc<dyn AccessPolicy>,
    pub assets: Arc<dyn SettlementAssets>,
    pub store: Arc<dyn LedgerStore>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Default)]
struct Ledger {
    markets: BTreeMap<MarketId, MarketBook>,
}

/// Lifecycle transition applied by a management call.
struct Transition {
    from: MarketState,
    to: MarketState,
}

impl Settlement for Transition {}

/// Removes a market from the in-flight set on drop.
struct SettlementGuard<'a> {
    in_flight: &'a Mutex<HashSet<MarketId>>,
    market_id: MarketId,
}

impl Drop for SettlementGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.market_id);
    }
}

/// The wagering ledger.
pub struct LedgerEngine {
    ledger: ReentrantMutex<RefCell<Ledger>>,
    in_flight: Mutex<HashSet<MarketId>>,
    paused: AtomicBool,
    settings: LedgerSettings,
    ports: EnginePorts,
}

impl LedgerEngine {
    /// Create an engine with no markets.
    #[must_use]
    pub fn new(settings: LedgerSettings, ports: EnginePorts) -> Self {
        Self {
            ledger: ReentrantMutex::new(RefCell::new(Ledger::default())),
            in_flight: Mutex::new(HashSet::new()),
            paused: AtomicBool::new(settings.paused),
            settings,
            ports,
        }
    }

    /// Create an engine holding every market in the store.
    ///
    /// # Errors
    /// Returns the store's error if loading fails.
    pub fn load(settings: LedgerSettings, ports: EnginePorts) -> Result<Self> {
        let books = ports.store.load_markets()?;
        let engine = Self::new(settings, ports);
        {
            let guard = engine.ledger.lock();
            let mut state = guard.borrow_mut();
            for book in books {
                state.markets.insert(book.id().clone(), book);
            }
            info!(markets = state.markets.len(), "Ledger loaded");
        }
        Ok(engine)
    }

    #[must_use]
    pub const fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Whether the pause switch is set.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Block wagers and claims.
    ///
    /// # Errors
    /// `Unauthorized` unless the caller may administer the ledger.
    pub fn pause(&self, caller: &AccountId) -> Result<()> {
        self.set_paused(caller, true)
    }

    /// Lift the pause switch.
    ///
    /// # Errors
    /// `Unauthorized` unless the caller may administer the ledger.
    pub fn unpause(&self, caller: &AccountId) -> Result<()> {
        self.set_paused(caller, false)
    }

    fn set_paused(&self, caller: &AccountId, paused: bool) -> Result<()> {
        self.authorize(caller, Action::Administer)?;
        let _order = self.ledger.lock();
        if self.paused.swap(paused, Ordering::SeqCst) != paused {
            warn!(paused, by = %caller, "Pause switch changed");
            self.emit(&LedgerEvent::PauseChanged {
                paused,
                by: caller.clone(),
            });
        }
        Ok(())
    }

    /// Create a market in `Inactive`.
    ///
    /// # Errors
    /// `Unauthorized`, a validation error, `MarketExists`, or a store error.
    pub fn create_market(&self, caller: &AccountId, spec: NewMarket) -> Result<MarketId> {
        self.authorize(caller, Action::CreateMarket)?;
        let ledger = self.ledger.lock();
        let book = MarketBook::create(&spec, self.ports.clock.now())?;
        let market_id = book.id().clone();
        {
            let mut state = Self::state_mut(&ledger, &market_id)?;
            if state.markets.contains_key(&market_id) {
                return Err(LedgerError::MarketExists { market_id }.into());
            }
            self.ports.store.save_market(&book)?;
            state.markets.insert(market_id.clone(), book);
        }
        info!(
            market_id = %market_id,
            asset = %spec.asset,
            model = %spec.model,
            outcomes = spec.outcome_count,
            "Market created"
        );
        self.emit(&LedgerEvent::MarketCreated {
            market_id: market_id.clone(),
            asset: spec.asset,
            model: spec.model,
            outcome_count: spec.outcome_count,
        });
        Ok(market_id)
    }

    /// Add operator funds to a market's reserve.
    ///
    /// # Errors
    /// `Unauthorized`, `UnknownMarket`, `InvalidParam` or `TransferFailed`.
    pub fn fund_reserve(
        &self,
        caller: &AccountId,
        market_id: &MarketId,
        from: &AccountId,
        amount: Amount,
    ) -> Result<ReserveMove> {
        self.authorize(caller, Action::Administer)?;
        self.mutate(
            market_id,
            |book, _| book.fund(from, amount),
            |moved: &ReserveMove| LedgerEvent::ReserveFunded {
                market_id: market_id.clone(),
                account: from.clone(),
                amount: moved.amount,
            },
        )
    }

    /// Withdraw reserve not needed to back liabilities and the fee.
    ///
    /// # Errors
    /// `Unauthorized`, `UnknownMarket`, `SolvencyExceeded` or `TransferFailed`.
    pub fn withdraw_surplus(
        &self,
        caller: &AccountId,
        market_id: &MarketId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<ReserveMove> {
        self.authorize(caller, Action::Administer)?;
        self.mutate(
            market_id,
            |book, _| book.withdraw(to, amount),
            |moved: &ReserveMove| LedgerEvent::ReserveWithdrawn {
                market_id: market_id.clone(),
                account: to.clone(),
                amount: moved.amount,
            },
        )
    }

    // ------------------------------------------------------------------
    // Odds
    // ------------------------------------------------------------------

    /// Point new wagers on `outcome` at `quote`.
    ///
    /// # Errors
    /// `Unauthorized`, `UnknownMarket`, `InvalidOutcome` or `WrongState`.
    pub fn set_active_odds(
        &self,
        caller: &AccountId,
        market_id: &MarketId,
        outcome: u8,
        quote: Quote,
    ) -> Result<OddsUpdate> {
        self.authorize(caller, Action::SetOdds)?;
        self.mutate(
            market_id,
            |book, _| book.set_odds(outcome, quote),
            |update: &OddsUpdate| LedgerEvent::OddsChanged {
                market_id: market_id.clone(),
                outcome,
                index: update.index,
                quote,
                appended: update.appended,
            },
        )
    }

    /// Point new wagers on `outcome` at `odds` paired with a handicap `line`.
    ///
    /// The same odds under a different line is a distinct history entry.
    ///
    /// # Errors
    /// Same as [`Self::set_active_odds`].
    pub fn set_active_odds_with_line(
        &self,
        caller: &AccountId,
        market_id: &MarketId,
        outcome: u8,
        odds: Odds,
        line: Line,
    ) -> Result<OddsUpdate> {
        self.set_active_odds(caller, market_id, outcome, Quote::with_line(odds, line))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// `Inactive -> Open`.
    ///
    /// # Errors
    /// `Unauthorized`, `UnknownMarket` or `WrongState`.
    pub fn open_market(&self, caller: &AccountId, market_id: &MarketId) -> Result<()> {
        self.transition(caller, market_id, MarketBook::open)
    }

    /// `Open -> Suspended`.
    ///
    /// # Errors
    /// `Unauthorized`, `UnknownMarket` or `WrongState`.
    pub fn suspend_market(&self, caller: &AccountId, market_id: &MarketId) -> Result<()> {
        self.transition(caller, market_id, MarketBook::suspend)
    }

    /// `Suspended -> Open`.
    ///
    /// # Errors
    /// `Unauthorized`, `UnknownMarket` or `WrongState`.
    pub fn resume_market(&self, caller: &AccountId, market_id: &MarketId) -> Result<()> {
        self.transition(caller, market_id, MarketBook::resume)
    }

    /// `Open -> Closed`.
    ///
    /// # Errors
    /// `Unauthorized`, `UnknownMarket` or `WrongState`.
    pub fn close_market(&self, caller: &AccountId, market_id: &MarketId) -> Result<()> {
        self.transition(caller, market_id, MarketBook::close)
    }

    /// Any non-terminal state `-> Cancelled`.
    ///
    /// # Errors
    /// `Unauthorized`, `UnknownMarket`, `AlreadySettled` or `WrongState`.
    pub fn cancel_market(&self, caller: &AccountId, market_id: &MarketId) -> Result<()> {
        self.transition(caller, market_id, MarketBook::cancel)
    }

    fn transition(
        &self,
        caller: &AccountId,
        market_id: &MarketId,
        apply: fn(&mut MarketBook) -> std::result::Result<(), LedgerError>,
    ) -> Result<()> {
        self.authorize(caller, Action::ManageMarket)?;
        let change = self.mutate(
            market_id,
            |book, _| {
                let from = book.market().state();
                apply(book)?;
                Ok(Transition {
                    from,
                    to: book.market().state(),
                })
            },
            |change: &Transition| LedgerEvent::MarketStateChanged {
                market_id: market_id.clone(),
                from: change.from,
                to: change.to,
            },
        )?;
        info!(market_id = %market_id, from = %change.from, to = %change.to, "Market state changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Wagering and settlement
    // ------------------------------------------------------------------

    /// Accept a wager at the outcome's active odds.
    ///
    /// # Errors
    /// `Paused`, `UnknownMarket`, `BettingClosed`, `InvalidParam`,
    /// `InvalidOutcome`, `OddsNotSet`, `InsufficientReserve` or
    /// `TransferFailed`.
    pub fn place(
        &self,
        owner: &AccountId,
        market_id: &MarketId,
        outcome: u8,
        stake: Amount,
    ) -> Result<Placement> {
        self.check_not_paused()?;
        let placement = self.mutate(
            market_id,
            |book, now| book.place(owner, outcome, stake, now),
            |placed: &Placement| {
                LedgerEvent::BetPlaced(BetEvent {
                    market_id: market_id.clone(),
                    owner: owner.clone(),
                    bet_index: placed.bet_index,
                    outcome,
                    stake,
                    odds_index: placed.odds_index,
                    quote: placed.quote,
                })
            },
        )?;
        debug!(
            market_id = %market_id,
            owner = %owner,
            bet_index = placement.bet_index,
            outcome,
            stake = %stake,
            "Bet placed"
        );
        Ok(placement)
    }

    /// Declare the winning outcome.
    ///
    /// # Errors
    /// `Unauthorized`, `UnknownMarket`, `AlreadySettled`, `InvalidOutcome`
    /// or `WrongState`.
    pub fn resolve(
        &self,
        caller: &AccountId,
        market_id: &MarketId,
        winning_outcome: u8,
    ) -> Result<Resolution> {
        self.authorize(caller, Action::Resolve)?;
        let resolution = self.mutate(
            market_id,
            |book, now| book.resolve(winning_outcome, now),
            |resolved: &Resolution| LedgerEvent::MarketResolved {
                market_id: market_id.clone(),
                winning_outcome: resolved.winning_outcome,
                fee: resolved.fee,
                winning_pool: resolved.winning_pool,
            },
        )?;
        info!(
            market_id = %market_id,
            winning_outcome,
            fee = %resolution.fee,
            released = %resolution.released_liability,
            "Market resolved"
        );
        Ok(resolution)
    }

    /// Collect one winning bet.
    ///
    /// # Errors
    /// `Paused`, `UnknownMarket`, `Reentrant`, `NotSettled`, `UnknownBet`,
    /// `AlreadyClaimed`, `BetLost` or `TransferFailed`.
    pub fn claim(
        &self,
        owner: &AccountId,
        market_id: &MarketId,
        bet_index: usize,
    ) -> Result<Payout> {
        self.check_not_paused()?;
        let fee_recipient = &self.settings.fee_recipient;
        self.mutate(
            market_id,
            |book, _| book.claim(owner, bet_index, fee_recipient),
            |payout: &Payout| self.claimed_event(market_id, owner, payout),
        )
    }

    /// Collect every unclaimed winning bet in one release.
    ///
    /// # Errors
    /// `Paused`, `UnknownMarket`, `Reentrant`, `NotSettled`,
    /// `NothingToClaim` or `TransferFailed`.
    pub fn claim_all(&self, owner: &AccountId, market_id: &MarketId) -> Result<Payout> {
        self.check_not_paused()?;
        let fee_recipient = &self.settings.fee_recipient;
        self.mutate(
            market_id,
            |book, _| book.claim_all(owner, fee_recipient),
            |payout: &Payout| self.claimed_event(market_id, owner, payout),
        )
    }

    /// Get a stake back from a cancelled market.
    ///
    /// # Errors
    /// `Paused`, `UnknownMarket`, `Reentrant`, `WrongState`, `UnknownBet`,
    /// `AlreadyClaimed` or `TransferFailed`.
    pub fn claim_refund(
        &self,
        owner: &AccountId,
        market_id: &MarketId,
        bet_index: usize,
    ) -> Result<Refund> {
        self.check_not_paused()?;
        self.mutate(
            market_id,
            |book, _| book.refund(owner, bet_index),
            |refund: &Refund| LedgerEvent::Refunded {
                market_id: market_id.clone(),
                owner: owner.clone(),
                bet_index: refund.bet_index,
                amount: refund.amount,
            },
        )
    }

    /// Send the reserve of a market nobody won to the fee recipient.
    ///
    /// # Errors
    /// `Unauthorized`, `UnknownMarket`, `Reentrant`, `NotSettled`,
    /// `WinnersExist`, `NothingToClaim` or `TransferFailed`.
    pub fn sweep_if_no_winners(
        &self,
        caller: &AccountId,
        market_id: &MarketId,
    ) -> Result<ReserveMove> {
        self.authorize(caller, Action::Administer)?;
        let recipient = &self.settings.fee_recipient;
        let swept = self.mutate(
            market_id,
            |book, _| book.sweep(recipient),
            |swept: &ReserveMove| LedgerEvent::Swept {
                market_id: market_id.clone(),
                recipient: recipient.clone(),
                amount: swept.amount,
            },
        )?;
        info!(
            market_id = %market_id,
            amount = %swept.amount,
            recipient = %recipient,
            "Reserve swept"
        );
        Ok(swept)
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// A market's current state.
    ///
    /// # Errors
    /// `UnknownMarket`.
    pub fn market(&self, market_id: &MarketId) -> Result<Market> {
        self.read(market_id, |book| Ok(book.market().clone()))
    }

    /// Full copy of a market's book.
    ///
    /// # Errors
    /// `UnknownMarket`.
    pub fn book(&self, market_id: &MarketId) -> Result<MarketBook> {
        self.read(market_id, |book| Ok(book.clone()))
    }

    /// Every market, ordered by id.
    #[must_use]
    pub fn markets(&self) -> Vec<Market> {
        let ledger = self.ledger.lock();
        let state = ledger.borrow();
        state.markets.values().map(|book| book.market().clone()).collect()
    }

    /// Quote new wagers on `outcome` lock in.
    ///
    /// # Errors
    /// `UnknownMarket` or `InvalidOutcome`.
    pub fn current_odds(&self, market_id: &MarketId, outcome: u8) -> Result<Option<Quote>> {
        self.read(market_id, |book| book.current_odds(outcome))
    }

    /// Deduplicated quote history of `outcome`.
    ///
    /// # Errors
    /// `UnknownMarket` or `InvalidOutcome`.
    pub fn odds_history(&self, market_id: &MarketId, outcome: u8) -> Result<Vec<Quote>> {
        self.read(market_id, |book| book.odds_history(outcome).map(<[Quote]>::to_vec))
    }

    /// Sum of all stakes on a market.
    ///
    /// # Errors
    /// `UnknownMarket`.
    pub fn total_pool(&self, market_id: &MarketId) -> Result<Amount> {
        self.read(market_id, |book| Ok(book.market().total_pool()))
    }

    /// What `owner` could collect from a market right now.
    ///
    /// # Errors
    /// `UnknownMarket`.
    pub fn pending_payout(&self, market_id: &MarketId, owner: &AccountId) -> Result<Amount> {
        self.read(market_id, |book| Ok(book.pending_payout(owner)))
    }

    /// The owner's bets in placement order.
    ///
    /// # Errors
    /// `UnknownMarket`.
    pub fn bets(&self, market_id: &MarketId, owner: &AccountId) -> Result<Vec<BetView>> {
        self.read(market_id, |book| Ok(book.bet_views(owner)))
    }

    /// Reserve, liability and pool of one market.
    ///
    /// # Errors
    /// `UnknownMarket`.
    pub fn solvency(&self, market_id: &MarketId) -> Result<SolvencyView> {
        self.read(market_id, |book| Ok(book.solvency_view()))
    }

    /// Solvency summed over every market in `asset`.
    #[must_use]
    pub fn asset_solvency(&self, asset: &AssetId) -> SolvencyView {
        let ledger = self.ledger.lock();
        let state = ledger.borrow();
        state
            .markets
            .values()
            .filter(|book| book.asset() == asset)
            .fold(SolvencyView::empty(asset.clone()), |mut total, book| {
                total.absorb(&book.solvency_view());
                total
            })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn authorize(&self, caller: &AccountId, action: Action) -> Result<()> {
        if !self.ports.access.can(caller, action) {
            warn!(caller = %caller, action = %action, "Unauthorized");
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action,
            }
            .into());
        }
        Ok(())
    }

    fn check_not_paused(&self) -> Result<()> {
        if self.is_paused() {
            return Err(LedgerError::Paused.into());
        }
        Ok(())
    }

    fn claimed_event(
        &self,
        market_id: &MarketId,
        owner: &AccountId,
        payout: &Payout,
    ) -> LedgerEvent {
        if !payout.fee.is_zero() {
            info!(
                market_id = %market_id,
                fee = %payout.fee,
                recipient = %self.settings.fee_recipient,
                "Fee charged"
            );
        }
        LedgerEvent::Claimed {
            market_id: market_id.clone(),
            owner: owner.clone(),
            bet_indices: payout.bet_indices.clone(),
            amount: payout.amount,
            fee: payout.fee,
        }
    }

    fn emit(&self, event: &LedgerEvent) {
        self.ports.notifier.notify(event);
    }

    fn state_mut<'a>(
        cell: &'a RefCell<Ledger>,
        market_id: &MarketId,
    ) -> std::result::Result<RefMut<'a, Ledger>, LedgerError> {
        cell.try_borrow_mut().map_err(|_| LedgerError::Reentrant {
            market_id: market_id.clone(),
        })
    }

    fn read<T>(
        &self,
        market_id: &MarketId,
        view: impl FnOnce(&MarketBook) -> std::result::Result<T, LedgerError>,
    ) -> Result<T> {
        let ledger = self.ledger.lock();
        let state = ledger.borrow();
        let book = state
            .markets
            .get(market_id)
            .ok_or_else(|| LedgerError::UnknownMarket {
                market_id: market_id.clone(),
            })?;
        Ok(view(book)?)
    }

    fn enter(
        &self,
        market_id: &MarketId,
    ) -> std::result::Result<SettlementGuard<'_>, LedgerError> {
        if !self.in_flight.lock().insert(market_id.clone()) {
            warn!(market_id = %market_id, "Re-entrant call refused");
            return Err(LedgerError::Reentrant {
                market_id: market_id.clone(),
            });
        }
        Ok(SettlementGuard {
            in_flight: &self.in_flight,
            market_id: market_id.clone(),
        })
    }

    /// Apply `op` to one market as a single indivisible unit.
    fn mutate<T, F, E>(&self, market_id: &MarketId, op: F, announce: E) -> Result<T>
    where
        T: Settlement,
        F: FnOnce(&mut MarketBook, DateTime<Utc>) -> std::result::Result<T, LedgerError>,
        E: FnOnce(&T) -> LedgerEvent,
    {
        let ledger = self.ledger.lock();
        let _guard = self.enter(market_id)?;
        let now = self.ports.clock.now();

        let (outcome, snapshot, asset) = {
            let mut state = Self::state_mut(&ledger, market_id)?;
            let book = state
                .markets
                .get_mut(market_id)
                .ok_or_else(|| LedgerError::UnknownMarket {
                    market_id: market_id.clone(),
                })?;
            let snapshot = book.clone();
            let outcome = match op(book, now) {
                Ok(outcome) => outcome,
                Err(err) => {
                    *book = snapshot;
                    return Err(err.into());
                }
            };
            if let Err(err) = self.ports.store.save_market(book) {
                error!(market_id = %market_id, error = %err, "Failed to persist market");
                *book = snapshot;
                return Err(err);
            }
            (outcome, snapshot, book.asset().clone())
        };

        let transfers = outcome.transfers();
        if !transfers.is_empty() {
            if let Err(err) = self.ports.assets.settle(&asset, transfers) {
                warn!(market_id = %market_id, error = %err, "Transfer failed, rolling back");
                let reason = err.to_string();
                if let Err(persist) = self.restore(&ledger, snapshot) {
                    return Err(Error::RollbackNotPersisted {
                        transfer: reason,
                        persist: persist.to_string(),
                    });
                }
                return Err(LedgerError::TransferFailed { reason }.into());
            }
        }

        self.emit(&announce(&outcome));
        Ok(outcome)
    }

    /// Put `snapshot` back in memory and storage. Memory is restored even
    /// when the save fails.
    fn restore(&self, ledger: &RefCell<Ledger>, snapshot: MarketBook) -> Result<()> {
        let mut state = ledger.borrow_mut();
        let market_id = snapshot.id().clone();
        let saved = self.ports.store.save_market(&snapshot);
        if let Err(err) = &saved {
            error!(market_id = %market_id, error = %err, "Failed to persist rollback");
        }
        state.markets.insert(market_id, snapshot);
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;
    use crate::testkit::access::AllowAll;
    use crate::testkit::assets::FlakyAssets;
    use crate::testkit::clock::ManualClock;
    use crate::testkit::engine::{fixed_market, EngineHarness, ASSET, STARTING_BALANCE};
    use crate::testkit::notifier::RecordingNotifier;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Store whose saves start failing once the allowance runs out.
    #[derive(Default)]
    struct BrittleStore {
        inner: MemoryStore,
        allowance: Mutex<Option<usize>>,
    }

    impl BrittleStore {
        fn allow(&self, saves: usize) {
            *self.allowance.lock() = Some(saves);
        }
    }

    impl LedgerStore for BrittleStore {
        fn save_market(&self, book: &MarketBook) -> Result<()> {
            let mut allowance = self.allowance.lock();
            match allowance.as_mut() {
                Some(0) => return Err(Error::Database("disk I/O error".into())),
                Some(left) => *left -= 1,
                None => {}
            }
            self.inner.save_market(book)
        }

        fn load_markets(&self) -> Result<Vec<MarketBook>> {
            self.inner.load_markets()
        }
    }

    #[test]
    fn unknown_market_is_reported() {
        let h = EngineHarness::new();
        let err = h
            .engine
            .place(&AccountId::new("alice"), &MarketId::new("nope"), 0, dec!(1))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Ledger(LedgerError::UnknownMarket { .. })
        ));
    }

    #[test]
    fn duplicate_market_rejected() {
        let h = EngineHarness::new();
        h.create(fixed_market("m1", &[20_000, 20_000]));
        let err = h
            .engine
            .create_market(&h.operator, fixed_market("m1", &[20_000, 20_000]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Ledger(LedgerError::MarketExists { .. })
        ));
    }

    #[test]
    fn pause_blocks_wagers_and_emits_once() {
        let h = EngineHarness::new();
        let id = h.create(fixed_market("m1", &[20_000, 20_000]));
        h.fund(&id, dec!(100));
        h.open(&id);

        h.engine.pause(&h.operator).unwrap();
        h.engine.pause(&h.operator).unwrap();
        assert!(h.engine.is_paused());
        let err = h.engine.place(&h.alice, &id, 0, dec!(1)).unwrap_err();
        assert!(matches!(err, Error::Ledger(LedgerError::Paused)));

        h.engine.unpause(&h.operator).unwrap();
        assert!(h.engine.place(&h.alice, &id, 0, dec!(1)).is_ok());
        assert_eq!(h.events.count("pause_changed"), 2);
    }

    #[test]
    fn failed_receive_leaves_no_bet() {
        let h = EngineHarness::new();
        let id = h.create(fixed_market("m1", &[20_000, 20_000]));
        h.fund(&id, dec!(100));
        h.open(&id);
        let before = h.engine.book(&id).unwrap();

        h.assets.fail_next("card declined");
        let err = h.engine.place(&h.alice, &id, 0, dec!(10)).unwrap_err();
        assert!(matches!(
            err,
            Error::Ledger(LedgerError::TransferFailed { .. })
        ));
        assert_eq!(h.engine.book(&id).unwrap(), before);
        assert_eq!(h.events.count("bet_placed"), 0);
    }

    #[test]
    fn unsaved_rollback_is_reported() {
        let store = Arc::new(BrittleStore::default());
        let assets = Arc::new(FlakyAssets::new());
        let events = Arc::new(RecordingNotifier::new());
        let ports = EnginePorts {
            access: Arc::new(AllowAll),
            assets: assets.clone(),
            store: store.clone(),
            notifier: events.clone(),
            clock: Arc::new(ManualClock::default()),
        };
        let engine = LedgerEngine::new(LedgerSettings::default(), ports);
        let operator = AccountId::new("operator");
        let alice = AccountId::new("alice");
        let asset = AssetId::new(ASSET);
        assets.deposit(&operator, &asset, Decimal::from(STARTING_BALANCE));
        assets.deposit(&alice, &asset, Decimal::from(STARTING_BALANCE));

        let id = engine
            .create_market(&operator, fixed_market("m1", &[20_000, 20_000]))
            .unwrap();
        engine
            .fund_reserve(&operator, &id, &operator, dec!(100))
            .unwrap();
        engine.open_market(&operator, &id).unwrap();
        let before = engine.book(&id).unwrap();

        store.allow(1);
        assets.fail_next("card declined");
        let err = engine.place(&alice, &id, 0, dec!(10)).unwrap_err();
        assert!(matches!(err, Error::RollbackNotPersisted { .. }));
        assert_eq!(engine.book(&id).unwrap(), before);
        assert_eq!(events.count("bet_placed"), 0);
    }

    #[test]
    fn events_follow_successful_operations() {
        let h = EngineHarness::new();
        let id = h.create(fixed_market("m1", &[20_000, 20_000]));
        h.fund(&id, dec!(100));
        h.open(&id);
        h.engine.place(&h.alice, &id, 0, dec!(10)).unwrap();
        h.engine.close_market(&h.operator, &id).unwrap();
        h.engine.resolve(&h.operator, &id, 0).unwrap();
        h.engine.claim(&h.alice, &id, 0).unwrap();

        assert_eq!(
            h.events.names(),
            vec![
                "market_created",
                "reserve_funded",
                "market_state_changed",
                "bet_placed",
                "market_state_changed",
                "market_resolved",
                "claimed",
            ]
        );
    }
}
