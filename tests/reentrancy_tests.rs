//! An asset adapter calling back into the engine cannot double-pay.

mod support;

use std::sync::Arc;

use oddsledger::adapter::outbound::memory::MemoryStore;
use oddsledger::application::{EnginePorts, LedgerEngine, LedgerSettings};
use oddsledger::domain::{AccountId, AssetId, LedgerError, MarketId};
use oddsledger::testkit::access::AllowAll;
use oddsledger::testkit::assets::ReentrantAssets;
use oddsledger::testkit::clock::ManualClock;
use oddsledger::testkit::engine::fixed_market;
use oddsledger::testkit::notifier::RecordingNotifier;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use support::assertions::ledger_error;

struct Rig {
    engine: Arc<LedgerEngine>,
    assets: Arc<ReentrantAssets>,
    operator: AccountId,
    alice: AccountId,
}

fn rig() -> Rig {
    let assets = Arc::new(ReentrantAssets::new());
    let ports = EnginePorts {
        access: Arc::new(AllowAll),
        assets: assets.clone(),
        store: Arc::new(MemoryStore::new()),
        notifier: Arc::new(RecordingNotifier::new()),
        clock: Arc::new(ManualClock::default()),
    };
    let engine = Arc::new(LedgerEngine::new(LedgerSettings::default(), ports));
    assets.attach(&engine);

    let operator = AccountId::new("operator");
    let alice = AccountId::new("alice");
    let usdc = AssetId::new("USDC");
    assets.deposit(&operator, &usdc, dec!(10_000));
    assets.deposit(&alice, &usdc, dec!(1_000));
    Rig {
        engine,
        assets,
        operator,
        alice,
    }
}

fn resolved_market(rig: &Rig, id: &str) -> MarketId {
    let engine = &rig.engine;
    let id = engine
        .create_market(&rig.operator, fixed_market(id, &[20_000, 20_000]))
        .unwrap();
    engine
        .fund_reserve(&rig.operator, &id, &rig.operator, dec!(500))
        .unwrap();
    engine.open_market(&rig.operator, &id).unwrap();
    engine.place(&rig.alice, &id, 0, dec!(100)).unwrap();
    engine.close_market(&rig.operator, &id).unwrap();
    engine.resolve(&rig.operator, &id, 0).unwrap();
    id
}

#[test]
fn nested_claim_on_the_same_market_is_refused() {
    let rig = rig();
    let id = resolved_market(&rig, "derby");
    let usdc = AssetId::new("USDC");

    rig.assets.arm(rig.alice.clone(), id.clone());
    let payout = rig.engine.claim(&rig.alice, &id, 0).unwrap();

    let attempts = rig.assets.take_attempts();
    assert_eq!(attempts.len(), 1);
    let nested = attempts.into_iter().next().unwrap().unwrap_err();
    assert!(matches!(ledger_error(nested), LedgerError::Reentrant { .. }));

    assert_eq!(payout.amount, dec!(200));
    assert_eq!(rig.assets.balance(&rig.alice, &usdc), dec!(1_100));
}

#[test]
fn nested_claim_after_commit_sees_the_bet_claimed() {
    let rig = rig();
    let first = resolved_market(&rig, "first");
    let second = resolved_market(&rig, "second");

    rig.engine.claim(&rig.alice, &first, 0).unwrap();
    rig.assets.arm(rig.alice.clone(), first.clone());
    rig.engine.claim(&rig.alice, &second, 0).unwrap();

    let nested = rig.assets.take_attempts().into_iter().next().unwrap().unwrap_err();
    assert!(matches!(
        ledger_error(nested),
        LedgerError::AlreadyClaimed { .. }
    ));
    assert_eq!(
        rig.engine.pending_payout(&second, &rig.alice).unwrap(),
        Decimal::ZERO
    );
}
