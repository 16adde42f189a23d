use oddsledger::domain::{LedgerError, MarketId};
use oddsledger::error::Error;
use oddsledger::testkit::engine::EngineHarness;

/// Unwrap the ledger rejection inside `err`.
pub fn ledger_error(err: Error) -> LedgerError {
    match err {
        Error::Ledger(err) => err,
        other => panic!("expected a ledger error, got {other:?}"),
    }
}

/// Reserve covers everything the market still owes, and custody holds
/// exactly the reserve.
pub fn assert_solvent(h: &EngineHarness, market_id: &MarketId) {
    let book = h.engine.book(market_id).expect("market exists");
    let reserve = book.solvency().reserve_balance;
    assert!(
        reserve >= book.committed(),
        "reserve {reserve} below committed {} on {market_id}",
        book.committed()
    );
    assert_eq!(
        h.custody(),
        reserve,
        "custody diverged from the reserve of {market_id}"
    );
}
