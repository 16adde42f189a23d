//! Bets keep the odds they were placed at, however often the odds move.

mod support;

use oddsledger::domain::{Line, LedgerError, Odds, OddsIndex, Quote};
use oddsledger::testkit::engine::{fixed_market, quote, EngineHarness};
use rust_decimal_macros::dec;

use support::assertions::{assert_solvent, ledger_error};

#[test]
fn each_bet_is_paid_at_its_own_odds() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(1000));

    h.engine.place(&h.alice, &id, 0, dec!(100)).unwrap();
    h.engine
        .set_active_odds(&h.operator, &id, 0, quote(25_000))
        .unwrap();
    h.engine.place(&h.bob, &id, 0, dec!(100)).unwrap();
    h.settle(&id, 0);

    let alice = h.engine.claim(&h.alice, &id, 0).unwrap();
    let bob = h.engine.claim(&h.bob, &id, 0).unwrap();
    assert_eq!(alice.amount, dec!(200));
    assert_eq!(bob.amount, dec!(250));
    assert_eq!(h.balance(&h.alice), dec!(1_000_100));
    assert_eq!(h.balance(&h.bob), dec!(1_000_150));
    assert_solvent(&h, &id);
}

#[test]
fn three_outcome_market_locks_quotes_per_bet() {
    let h = EngineHarness::new();
    let id = h.open_fixed("final", &[20_000, 30_000, 25_000], dec!(2000));

    h.engine.place(&h.alice, &id, 0, dec!(1000)).unwrap();
    h.engine
        .set_active_odds(&h.operator, &id, 0, quote(18_000))
        .unwrap();
    h.engine.place(&h.bob, &id, 0, dec!(1000)).unwrap();
    h.settle(&id, 0);

    assert_eq!(h.engine.claim(&h.alice, &id, 0).unwrap().amount, dec!(2000));
    assert_eq!(h.engine.claim(&h.bob, &id, 0).unwrap().amount, dec!(1800));
    assert_eq!(h.engine.odds_history(&id, 0).unwrap().len(), 2);
    assert_eq!(h.engine.odds_history(&id, 1).unwrap().len(), 1);
    assert_solvent(&h, &id);
}

#[test]
fn returning_to_earlier_odds_reuses_their_index() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(1000));

    let moved = h
        .engine
        .set_active_odds(&h.operator, &id, 0, quote(25_000))
        .unwrap();
    assert!(moved.appended);
    assert_eq!(moved.index, OddsIndex::new(2).unwrap());

    let back = h
        .engine
        .set_active_odds(&h.operator, &id, 0, quote(20_000))
        .unwrap();
    assert!(!back.appended);
    assert_eq!(back.index, OddsIndex::new(1).unwrap());
    assert_eq!(h.engine.odds_history(&id, 0).unwrap().len(), 2);

    let placed = h.engine.place(&h.alice, &id, 0, dec!(10)).unwrap();
    assert_eq!(placed.odds_index, Some(OddsIndex::new(1).unwrap()));
    assert_eq!(h.events.count("odds_changed"), 2);
}

#[test]
fn a_line_makes_a_distinct_quote() {
    let h = EngineHarness::new();
    let id = h.open_fixed("spread", &[19_000, 19_000], dec!(1000));
    let odds = Odds::try_new(19_000).unwrap();

    let update = h
        .engine
        .set_active_odds_with_line(&h.operator, &id, 1, odds, Line::new(-150))
        .unwrap();
    assert!(update.appended);

    let history = h.engine.odds_history(&id, 1).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].line, Some(Line::new(-150)));
    assert_eq!(
        h.engine.current_odds(&id, 1).unwrap(),
        Some(Quote::with_line(odds, Line::new(-150)))
    );
}

#[test]
fn bet_views_report_the_locked_quote() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 30_000], dec!(1000));

    h.engine.place(&h.alice, &id, 1, dec!(10)).unwrap();
    h.engine
        .set_active_odds(&h.operator, &id, 1, quote(40_000))
        .unwrap();

    let views = h.engine.bets(&id, &h.alice).unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].quote, Some(quote(30_000)));
    assert!(!views[0].claimed);
}

#[test]
fn fixed_odds_market_without_odds_refuses_wagers() {
    let h = EngineHarness::new();
    let mut spec = fixed_market("blank", &[20_000, 20_000]);
    spec.initial_odds.clear();
    spec.outcome_count = 2;
    let id = h.create(spec);
    h.fund(&id, dec!(100));
    h.open(&id);

    let err = h.engine.place(&h.alice, &id, 0, dec!(5)).unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::OddsNotSet { outcome: 0, .. }
    ));
}

#[test]
fn odds_freeze_once_the_market_resolves() {
    let h = EngineHarness::new();
    let id = h.open_fixed("derby", &[20_000, 20_000], dec!(100));
    h.settle(&id, 1);

    let err = h
        .engine
        .set_active_odds(&h.operator, &id, 0, quote(30_000))
        .unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::WrongState { .. }));
}
