//! Randomized operation sequences never leave a market under-reserved.

mod support;

use oddsledger::domain::money::bps_of;
use oddsledger::domain::{AccountId, LedgerError, MarketId, MarketState};
use oddsledger::testkit::engine::{
    fixed_market, parimutuel_market, quote, EngineHarness, STARTING_BALANCE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use support::assertions::{assert_solvent, ledger_error};

const SEEDS: u64 = 24;
const STEPS: usize = 80;

fn stake(rng: &mut StdRng) -> Decimal {
    Decimal::new(rng.gen_range(100..20_000), 2)
}

fn punters(h: &EngineHarness) -> [AccountId; 3] {
    [h.alice.clone(), h.bob.clone(), h.carol.clone()]
}

fn wander(h: &EngineHarness, id: &MarketId, rng: &mut StdRng) {
    let accounts = punters(h);
    for _ in 0..STEPS {
        match rng.gen_range(0..10) {
            0..=5 => {
                let owner = &accounts[rng.gen_range(0..accounts.len())];
                let outcome = rng.gen_range(0..3);
                if let Err(err) = h.engine.place(owner, id, outcome, stake(rng)) {
                    assert!(matches!(
                        ledger_error(err),
                        LedgerError::InsufficientReserve { .. }
                            | LedgerError::BettingClosed { .. }
                    ));
                }
            }
            6 | 7 => {
                let outcome = rng.gen_range(0..3);
                let raw = rng.gen_range(10_001..60_000);
                h.engine
                    .set_active_odds(&h.operator, id, outcome, quote(raw))
                    .unwrap();
            }
            8 => {
                let state = h.engine.market(id).unwrap().state();
                if state == MarketState::Open {
                    h.engine.suspend_market(&h.operator, id).unwrap();
                } else {
                    h.engine.resume_market(&h.operator, id).unwrap();
                }
            }
            _ => {
                let amount = stake(rng);
                if rng.gen_bool(0.5) {
                    h.fund(id, amount);
                } else {
                    let _ = h
                        .engine
                        .withdraw_surplus(&h.operator, id, &h.operator, amount);
                }
            }
        }
        assert_solvent(h, id);
    }
}

fn finish(h: &EngineHarness, id: &MarketId, winner: u8) {
    if h.engine.market(id).unwrap().state() == MarketState::Suspended {
        h.engine.resume_market(&h.operator, id).unwrap();
    }
    h.settle(id, winner);
    assert_solvent(h, id);

    for owner in punters(h) {
        match h.engine.claim_all(&owner, id) {
            Ok(_) => {}
            Err(err) => assert!(matches!(
                ledger_error(err),
                LedgerError::NothingToClaim { .. }
            )),
        }
        assert_solvent(h, id);
    }
    let solvency = h.engine.solvency(id).unwrap();
    assert_eq!(solvency.outstanding_liability, Decimal::ZERO);
}

#[test]
fn fixed_odds_reserve_always_covers_liability() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let h = EngineHarness::new();
        let reserve = Decimal::from(rng.gen_range(50..3_000));
        let id = h.open_fixed("random", &[20_000, 30_000, 25_000], reserve);

        wander(&h, &id, &mut rng);
        finish(&h, &id, rng.gen_range(0..3));
    }
}

#[test]
fn fixed_odds_with_fee_stays_solvent() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(1_000 + seed);
        let h = EngineHarness::new();
        let mut spec = fixed_market("fee", &[15_000, 40_000, 22_000]);
        spec.fee_bps = rng.gen_range(0..=1_000);
        let id = h.create(spec);
        h.fund(&id, Decimal::from(rng.gen_range(50..3_000)));
        h.open(&id);

        wander(&h, &id, &mut rng);
        let winner = rng.gen_range(0..3);
        finish(&h, &id, winner);

        let market = h.engine.market(&id).unwrap();
        assert_eq!(market.fee(), bps_of(market.total_pool(), market.fee_bps()));
        if market.outcome_pool(winner) > Decimal::ZERO {
            assert!(market.fee_charged());
            assert_eq!(h.balance(&h.treasury), market.fee());
        }
    }
}

#[test]
fn parimutuel_never_pays_more_than_the_pool() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(2_000 + seed);
        let h = EngineHarness::new();
        let id = h.create(parimutuel_market("pool", 3, rng.gen_range(0..=1_000)));
        h.open(&id);

        let accounts = punters(&h);
        for _ in 0..STEPS / 2 {
            let owner = &accounts[rng.gen_range(0..accounts.len())];
            h.engine
                .place(owner, &id, rng.gen_range(0..3), stake(&mut rng))
                .unwrap();
        }
        let pool = h.engine.total_pool(&id).unwrap();
        let winner = rng.gen_range(0..3);
        finish(&h, &id, winner);

        let balances: Decimal = accounts.iter().map(|account| h.balance(account)).sum();
        let paid = balances - Decimal::from(3 * STARTING_BALANCE) + pool;
        let fee = h.balance(&h.treasury);
        assert!(paid + fee <= pool, "seed {seed}: paid {paid} + {fee} out of {pool}");

        let market = h.engine.market(&id).unwrap();
        if market.outcome_pool(winner) > Decimal::ZERO {
            assert_eq!(fee, bps_of(pool, market.fee_bps()));
        }
        assert!(h.custody() >= Decimal::ZERO);
    }
}
