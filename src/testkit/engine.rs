//! Engine harness wired to in-memory adapters.
//!
//! The harness grants the `operator` account every role and credits the
//! named accounts with [`STARTING_BALANCE`] of [`ASSET`] so tests can place
//! bets and fund reserves without setup.

use std::sync::Arc;

use rust_decimal::Decimal;

use super::assets::FlakyAssets;
use super::clock::ManualClock;
use super::notifier::RecordingNotifier;
use crate::adapter::outbound::access::RoleAccessPolicy;
use crate::adapter::outbound::memory::MemoryStore;
use crate::application::{EnginePorts, LedgerEngine, LedgerSettings};
use crate::domain::{AccountId, Amount, AssetId, MarketId, NewMarket, Odds, Quote};
use crate::port::{AccessPolicy, LedgerStore, SettlementAssets};

/// Asset every harness market is denominated in.
pub const ASSET: &str = "USDC";

/// Balance credited to each harness account.
pub const STARTING_BALANCE: i64 = 1_000_000;

/// Fixed-odds market over `odds`, one raw value per outcome.
///
/// # Panics
/// Panics if a raw value is outside the accepted odds range.
pub fn fixed_market(id: &str, odds: &[u32]) -> NewMarket {
    let odds = odds
        .iter()
        .map(|raw| Odds::try_new(*raw).expect("valid test odds"))
        .collect();
    NewMarket::fixed_odds(id, ASSET, odds)
}

/// Parimutuel market with `outcomes` outcomes and a fee.
pub fn parimutuel_market(id: &str, outcomes: u8, fee_bps: u16) -> NewMarket {
    let mut spec = NewMarket::parimutuel(id, ASSET, outcomes);
    spec.fee_bps = fee_bps;
    spec
}

/// Plain quote from a raw odds value.
///
/// # Panics
/// Panics if `raw` is outside the accepted odds range.
pub fn quote(raw: u32) -> Quote {
    Quote::plain(Odds::try_new(raw).expect("valid test odds"))
}

/// A ledger engine plus handles on every adapter behind it.
pub struct EngineHarness {
    pub engine: Arc<LedgerEngine>,
    pub assets: Arc<FlakyAssets>,
    pub store: Arc<MemoryStore>,
    pub events: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
    pub operator: AccountId,
    pub alice: AccountId,
    pub bob: AccountId,
    pub carol: AccountId,
    pub treasury: AccountId,
}

impl Default for EngineHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineHarness {
    pub fn new() -> Self {
        Self::with_settings(LedgerSettings::default())
    }

    pub fn with_settings(settings: LedgerSettings) -> Self {
        let operator = AccountId::new("operator");
        let access = RoleAccessPolicy::new()
            .with_administrators([operator.clone()])
            .with_market_makers([operator.clone()])
            .with_odds_setters([operator.clone()])
            .with_resolvers([operator.clone()]);
        Self::with_access(settings, Arc::new(access))
    }

    /// Build with a custom access policy.
    pub fn with_access(settings: LedgerSettings, access: Arc<dyn AccessPolicy>) -> Self {
        let assets = Arc::new(FlakyAssets::new());
        let store = Arc::new(MemoryStore::new());
        let events = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(ManualClock::default());
        let treasury = settings.fee_recipient.clone();

        let ports = EnginePorts {
            access,
            assets: Arc::clone(&assets) as Arc<dyn SettlementAssets>,
            store: Arc::clone(&store) as Arc<dyn LedgerStore>,
            notifier: events.clone(),
            clock: clock.clone(),
        };
        let harness = Self {
            engine: Arc::new(LedgerEngine::new(settings, ports)),
            assets,
            store,
            events,
            clock,
            operator: AccountId::new("operator"),
            alice: AccountId::new("alice"),
            bob: AccountId::new("bob"),
            carol: AccountId::new("carol"),
            treasury,
        };
        for account in [
            &harness.operator,
            &harness.alice,
            &harness.bob,
            &harness.carol,
        ] {
            harness.deposit(account, Decimal::from(STARTING_BALANCE));
        }
        harness
    }

    pub fn asset() -> AssetId {
        AssetId::new(ASSET)
    }

    /// Credit `account` outside the ledger.
    pub fn deposit(&self, account: &AccountId, amount: Amount) {
        self.assets.deposit(account, &Self::asset(), amount);
    }

    /// `account`'s balance in the vault.
    pub fn balance(&self, account: &AccountId) -> Amount {
        self.assets.balance(account, &Self::asset())
    }

    /// Funds the vault holds for the ledger.
    pub fn custody(&self) -> Amount {
        self.assets.custody_balance(&Self::asset())
    }

    /// # Panics
    /// Panics if the engine refuses the market.
    pub fn create(&self, spec: NewMarket) -> MarketId {
        self.engine
            .create_market(&self.operator, spec)
            .expect("create market")
    }

    /// Fund the reserve from the operator's balance.
    ///
    /// # Panics
    /// Panics if funding fails.
    pub fn fund(&self, market_id: &MarketId, amount: Amount) {
        self.engine
            .fund_reserve(&self.operator, market_id, &self.operator, amount)
            .expect("fund reserve");
    }

    /// # Panics
    /// Panics if the market cannot be opened.
    pub fn open(&self, market_id: &MarketId) {
        self.engine
            .open_market(&self.operator, market_id)
            .expect("open market");
    }

    /// # Panics
    /// Panics if the market cannot be closed.
    pub fn close(&self, market_id: &MarketId) {
        self.engine
            .close_market(&self.operator, market_id)
            .expect("close market");
    }

    /// Close then resolve in favor of `winner`.
    ///
    /// # Panics
    /// Panics if either step fails.
    pub fn settle(&self, market_id: &MarketId, winner: u8) {
        self.close(market_id);
        self.engine
            .resolve(&self.operator, market_id, winner)
            .expect("resolve market");
    }

    /// Create, fund and open a fixed-odds market in one go.
    pub fn open_fixed(&self, id: &str, odds: &[u32], reserve: Amount) -> MarketId {
        let market_id = self.create(fixed_market(id, odds));
        if !reserve.is_zero() {
            self.fund(&market_id, reserve);
        }
        self.open(&market_id);
        market_id
    }
}
