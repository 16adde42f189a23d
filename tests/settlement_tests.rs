//! Claims, fees, refunds, sweeps and rollback through the engine.

mod support;

use chrono::Duration;
use oddsledger::domain::LedgerError;
use oddsledger::port::Clock;
use oddsledger::testkit::engine::{fixed_market, parimutuel_market, quote, EngineHarness};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use support::assertions::{assert_solvent, ledger_error};

#[test]
fn a_bet_is_paid_exactly_once() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(500));
    h.engine.place(&h.alice, &id, 0, dec!(100)).unwrap();
    h.settle(&id, 0);

    h.engine.claim(&h.alice, &id, 0).unwrap();
    let after_first = h.balance(&h.alice);
    let err = h.engine.claim(&h.alice, &id, 0).unwrap_err();

    assert!(matches!(
        ledger_error(err),
        LedgerError::AlreadyClaimed { bet_index: 0, .. }
    ));
    assert_eq!(h.balance(&h.alice), after_first);
    assert_eq!(h.events.count("claimed"), 1);
    assert_eq!(h.engine.pending_payout(&id, &h.alice).unwrap(), Decimal::ZERO);
}

#[test]
fn losing_bets_cannot_be_claimed() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(500));
    h.engine.place(&h.alice, &id, 1, dec!(100)).unwrap();
    h.settle(&id, 0);

    let err = h.engine.claim(&h.alice, &id, 0).unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::BetLost { .. }));
    let err = h.engine.claim_all(&h.alice, &id).unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::NothingToClaim { .. }));
}

#[test]
fn claims_wait_for_resolution() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(500));
    h.engine.place(&h.alice, &id, 0, dec!(100)).unwrap();
    h.close(&id);

    let err = h.engine.claim(&h.alice, &id, 0).unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::NotSettled { .. }));
}

#[test]
fn fixed_odds_fee_is_charged_on_the_first_claim_only() {
    let h = EngineHarness::new();
    let mut spec = fixed_market("derby", &[20_000, 20_000]);
    spec.fee_bps = 500;
    let id = h.create(spec);
    h.fund(&id, dec!(1000));
    h.open(&id);

    h.engine.place(&h.alice, &id, 0, dec!(100)).unwrap();
    h.engine.place(&h.bob, &id, 0, dec!(50)).unwrap();
    h.engine.place(&h.carol, &id, 1, dec!(50)).unwrap();
    h.settle(&id, 0);
    assert_eq!(h.engine.market(&id).unwrap().fee(), dec!(10));

    let first = h.engine.claim(&h.alice, &id, 0).unwrap();
    let second = h.engine.claim(&h.bob, &id, 0).unwrap();

    assert_eq!(first.fee, dec!(10));
    assert_eq!(second.fee, Decimal::ZERO);
    assert_eq!(h.balance(&h.treasury), dec!(10));
    assert!(h.engine.market(&id).unwrap().fee_charged());
    assert_solvent(&h, &id);
}

#[test]
fn parimutuel_pool_is_shared_after_the_fee() {
    let h = EngineHarness::new();
    let id = h.create(parimutuel_market("pool", 2, 500));
    h.open(&id);

    h.engine.place(&h.alice, &id, 0, dec!(300)).unwrap();
    h.engine.place(&h.bob, &id, 0, dec!(100)).unwrap();
    h.engine.place(&h.carol, &id, 1, dec!(600)).unwrap();
    h.settle(&id, 0);

    let alice = h.engine.claim_all(&h.alice, &id).unwrap();
    let bob = h.engine.claim_all(&h.bob, &id).unwrap();

    assert_eq!(alice.amount, dec!(712.5));
    assert_eq!(bob.amount, dec!(237.5));
    assert_eq!(alice.fee + bob.fee, dec!(50));
    assert_eq!(h.balance(&h.treasury), dec!(50));
    assert_eq!(h.custody(), Decimal::ZERO);
}

#[test]
fn claim_all_pays_the_sum_of_individual_claims() {
    let setup = || {
        let h = EngineHarness::new();
        let id = h.open_fixed("derby", &[20_000, 30_000], dec!(5000));
        h.engine.place(&h.alice, &id, 0, dec!(100)).unwrap();
        h.engine
            .set_active_odds(&h.operator, &id, 0, quote(22_500))
            .unwrap();
        h.engine.place(&h.alice, &id, 0, dec!(40)).unwrap();
        h.engine.place(&h.alice, &id, 1, dec!(70)).unwrap();
        h.engine.place(&h.alice, &id, 0, dec!(12.5)).unwrap();
        h.settle(&id, 0);
        (h, id)
    };

    let (single, id) = setup();
    let individual: Decimal = [0, 1, 3]
        .into_iter()
        .map(|index| single.engine.claim(&single.alice, &id, index).unwrap().amount)
        .sum();

    let (batch, id) = setup();
    let all = batch.engine.claim_all(&batch.alice, &id).unwrap();

    assert_eq!(all.amount, individual);
    assert_eq!(all.bet_indices, vec![0, 1, 3]);
    assert_eq!(batch.balance(&batch.alice), single.balance(&single.alice));
    assert_eq!(batch.assets.batches().last().map(Vec::len), Some(1));

    let err = batch.engine.claim(&batch.alice, &id, 1).unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::AlreadyClaimed { .. }
    ));
}

#[test]
fn cancelled_market_refunds_every_stake_once() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(1000));
    h.engine.place(&h.alice, &id, 0, dec!(100)).unwrap();
    h.engine.place(&h.bob, &id, 1, dec!(50)).unwrap();
    h.engine.cancel_market(&h.operator, &id).unwrap();

    let refund = h.engine.claim_refund(&h.alice, &id, 0).unwrap();
    assert_eq!(refund.amount, dec!(100));
    assert_eq!(h.balance(&h.alice), dec!(1_000_000));
    let err = h.engine.claim_refund(&h.alice, &id, 0).unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::AlreadyClaimed { .. }
    ));

    assert_eq!(h.engine.pending_payout(&id, &h.bob).unwrap(), dec!(50));
    h.engine
        .withdraw_surplus(&h.operator, &id, &h.operator, dec!(1000))
        .unwrap();
    let err = h
        .engine
        .withdraw_surplus(&h.operator, &id, &h.operator, dec!(1))
        .unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::SolvencyExceeded { .. }
    ));

    h.engine.claim_refund(&h.bob, &id, 0).unwrap();
    assert_eq!(h.custody(), Decimal::ZERO);
    assert_eq!(h.events.count("refunded"), 2);
}

#[test]
fn refunds_need_a_cancelled_market() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(1000));
    h.engine.place(&h.alice, &id, 0, dec!(100)).unwrap();

    let err = h.engine.claim_refund(&h.alice, &id, 0).unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::WrongState { .. }));
}

#[test]
fn resolved_markets_cannot_be_cancelled() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(100));
    h.settle(&id, 0);

    let err = h.engine.cancel_market(&h.operator, &id).unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::AlreadySettled { .. }
    ));
}

#[test]
fn sweep_only_when_nobody_won() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(500));
    h.engine.place(&h.alice, &id, 1, dec!(100)).unwrap();

    let err = h.engine.sweep_if_no_winners(&h.operator, &id).unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::NotSettled { .. }));

    h.settle(&id, 0);
    let swept = h.engine.sweep_if_no_winners(&h.operator, &id).unwrap();
    assert_eq!(swept.amount, dec!(600));
    assert_eq!(h.balance(&h.treasury), dec!(600));
    assert_eq!(h.custody(), Decimal::ZERO);

    let err = h.engine.sweep_if_no_winners(&h.operator, &id).unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::NothingToClaim { .. }
    ));
}

#[test]
fn sweep_refused_while_winners_exist() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(500));
    h.engine.place(&h.alice, &id, 0, dec!(100)).unwrap();
    h.settle(&id, 0);

    let err = h.engine.sweep_if_no_winners(&h.operator, &id).unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::WinnersExist { .. }));
    assert_eq!(h.engine.claim(&h.alice, &id, 0).unwrap().amount, dec!(200));
}

#[test]
fn failed_payout_rolls_back_the_claim() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(500));
    h.engine.place(&h.alice, &id, 0, dec!(100)).unwrap();
    h.settle(&id, 0);
    let before = h.engine.book(&id).unwrap();

    h.assets.fail_next("bank offline");
    let err = h.engine.claim(&h.alice, &id, 0).unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::TransferFailed { .. }
    ));
    assert_eq!(h.engine.book(&id).unwrap(), before);
    assert_eq!(h.store.get(&id), Some(before));

    assert_eq!(h.engine.claim(&h.alice, &id, 0).unwrap().amount, dec!(200));
    assert_eq!(h.events.count("claimed"), 1);
    assert_solvent(&h, &id);
}

#[test]
fn failed_funding_leaves_the_reserve_alone() {
    let h = EngineHarness::new();
    let id = h.create(fixed_market("derby", &[20_000, 20_000]));

    h.assets.fail_always("custody frozen");
    let err = h
        .engine
        .fund_reserve(&h.operator, &id, &h.operator, dec!(100))
        .unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::TransferFailed { .. }
    ));
    assert_eq!(
        h.engine.solvency(&id).unwrap().reserve_balance,
        Decimal::ZERO
    );
    h.assets.recover();
    h.fund(&id, dec!(100));
    assert_eq!(h.engine.solvency(&id).unwrap().reserve_balance, dec!(100));
}

#[test]
fn wagers_beyond_the_reserve_are_refused() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(50));

    let err = h.engine.place(&h.alice, &id, 0, dec!(100)).unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::InsufficientReserve { .. }
    ));
    assert_eq!(h.engine.total_pool(&id).unwrap(), Decimal::ZERO);
    assert!(h.engine.place(&h.alice, &id, 0, dec!(50)).is_ok());
}

#[test]
fn cutoff_closes_betting_and_allows_resolution() {
    let h = EngineHarness::new();
    let mut spec = fixed_market("derby", &[20_000, 20_000]);
    spec.betting_cutoff = Some(h.clock.now() + Duration::hours(1));
    let id = h.create(spec);
    h.fund(&id, dec!(500));
    h.open(&id);

    h.engine.place(&h.alice, &id, 0, dec!(10)).unwrap();
    let err = h.engine.resolve(&h.operator, &id, 0).unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::WrongState { .. }));

    h.clock.advance(Duration::hours(2));
    let err = h.engine.place(&h.bob, &id, 0, dec!(10)).unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::BettingClosed { .. }));

    h.engine.resolve(&h.operator, &id, 0).unwrap();
    assert_eq!(h.engine.market(&id).unwrap().winning_outcome(), Some(0));
}

#[test]
fn a_cutoff_already_passed_is_rejected() {
    let h = EngineHarness::new();
    let mut spec = fixed_market("derby", &[20_000, 20_000]);
    spec.betting_cutoff = Some(h.clock.now());
    let err = h.engine.create_market(&h.operator, spec).unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::InvalidParam {
            field: "betting_cutoff",
            ..
        }
    ));
    assert!(h.engine.markets().is_empty());
}

#[test]
fn an_oversized_stake_leaves_the_ledger_untouched() {
    let h = EngineHarness::new();
    let id = h.open_fixed("longshot", &[1_000_000, 20_000], dec!(1));
    let before = h.balance(&h.alice);

    let err = h
        .engine
        .place(&h.alice, &id, 0, Decimal::MAX / dec!(50))
        .unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::InvalidParam { field: "stake", .. }
    ));
    assert_eq!(h.engine.total_pool(&id).unwrap(), Decimal::ZERO);
    assert_eq!(h.balance(&h.alice), before);
    assert_solvent(&h, &id);
}

#[test]
fn only_role_holders_manage_markets() {
    let h = EngineHarness::new();
    let err = h
        .engine
        .create_market(&h.alice, fixed_market("derby", &[20_000, 20_000]))
        .unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::Unauthorized { .. }));

    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(100));
    let err = h.engine.resolve(&h.alice, &id, 0).unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::Unauthorized { .. }));
    let err = h.engine.pause(&h.alice).unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::Unauthorized { .. }));
}
