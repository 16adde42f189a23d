//! One market's full ledger state and its pure transitions.
//!
//! A [`MarketBook`] owns the market, one odds registry per outcome, the bet
//! ledger and the solvency counters. Every operation validates before it
//! mutates, so an `Err` leaves the book untouched. Operations that move
//! funds return the [`Transfer`]s to execute; executing them is the
//! caller's job.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::bet::{Bet, BetLedger};
use super::error::LedgerError;
use super::id::{AccountId, AssetId, MarketId};
use super::market::{Market, MarketState, NewMarket};
use super::money::{bps_of, Amount, Odds};
use super::odds::{OddsIndex, OddsRegistry, OddsUpdate, Quote};
use super::payout::PoolShare;
use super::solvency::{Solvency, SolvencyView};
use super::transfer::{non_zero, Settlement, Transfer};

/// An accepted wager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub bet_index: usize,
    pub outcome: u8,
    pub stake: Amount,
    pub odds_index: Option<OddsIndex>,
    pub quote: Option<Quote>,
    /// Liability the wager added.
    pub liability: Amount,
    pub transfers: Vec<Transfer>,
}

/// A market declared resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub winning_outcome: u8,
    pub fee: Amount,
    pub winning_pool: Amount,
    /// Liability dropped by re-pricing to the winning payouts.
    pub released_liability: Amount,
}

/// Winnings paid to one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payout {
    pub bet_indices: Vec<usize>,
    pub amount: Amount,
    /// Fee charged by this call; non-zero only on the market's first claim.
    pub fee: Amount,
    pub transfers: Vec<Transfer>,
}

/// A stake returned from a cancelled market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Refund {
    pub bet_index: usize,
    pub amount: Amount,
    pub transfers: Vec<Transfer>,
}

/// Reserve movement: funding, withdrawal or sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReserveMove {
    pub amount: Amount,
    pub transfers: Vec<Transfer>,
}

impl Settlement for Placement {
    fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }
}

impl Settlement for Payout {
    fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }
}

impl Settlement for Refund {
    fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }
}

impl Settlement for ReserveMove {
    fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }
}

impl Settlement for Resolution {}

impl Settlement for OddsUpdate {}

/// A bet as shown to callers, with its locked quote and current payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetView {
    pub bet_index: usize,
    pub owner: AccountId,
    pub outcome: u8,
    pub stake: Amount,
    pub odds_index: Option<OddsIndex>,
    pub quote: Option<Quote>,
    pub placed_at: DateTime<Utc>,
    pub claimed: bool,
}

/// Aggregate of one market's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketBook {
    market: Market,
    registries: Vec<OddsRegistry>,
    bets: BetLedger,
    solvency: Solvency,
}

impl MarketBook {
    /// Create a book for a new market in `Inactive`.
    ///
    /// # Errors
    /// Returns a validation error if `spec` is malformed or its betting
    /// cutoff is not after `now`.
    pub fn create(spec: &NewMarket, now: DateTime<Utc>) -> Result<Self, LedgerError> {
        spec.validate()?;
        if let Some(cutoff) = spec.betting_cutoff {
            if cutoff <= now {
                return Err(LedgerError::invalid(
                    "betting_cutoff",
                    format!("{} is not in the future", cutoff.to_rfc3339()),
                ));
            }
        }
        let mut registries = vec![OddsRegistry::new(); usize::from(spec.outcome_count)];
        for (registry, odds) in registries.iter_mut().zip(&spec.initial_odds) {
            registry.set_active(Quote::plain(*odds));
        }
        Ok(Self {
            market: Market::new(spec, now),
            registries,
            bets: BetLedger::new(),
            solvency: Solvency::default(),
        })
    }

    /// Reassemble a book from persisted parts.
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidParam`] if the parts disagree.
    pub fn from_parts(
        market: Market,
        registries: Vec<OddsRegistry>,
        bets: Vec<Bet>,
        solvency: Solvency,
    ) -> Result<Self, LedgerError> {
        if registries.len() != usize::from(market.outcome_count) {
            return Err(LedgerError::invalid(
                "odds_registries",
                format!(
                    "market {} has {} outcomes but {} registries",
                    market.id,
                    market.outcome_count,
                    registries.len()
                ),
            ));
        }
        if market.outcome_pools.len() != usize::from(market.outcome_count) {
            return Err(LedgerError::invalid("outcome_pools", "length mismatch"));
        }
        let mut ledger = BetLedger::new();
        for bet in bets {
            if bet.outcome >= market.outcome_count {
                return Err(LedgerError::InvalidOutcome {
                    outcome: bet.outcome,
                    outcome_count: market.outcome_count,
                });
            }
            if let Some(index) = bet.odds_index {
                if registries[usize::from(bet.outcome)].get(index).is_none() {
                    return Err(LedgerError::invalid(
                        "odds_index",
                        format!("bet references missing quote {index}"),
                    ));
                }
            }
            ledger.append(bet);
        }
        Ok(Self {
            market,
            registries,
            bets: ledger,
            solvency,
        })
    }

    #[must_use]
    pub fn id(&self) -> &MarketId {
        &self.market.id
    }

    #[must_use]
    pub const fn market(&self) -> &Market {
        &self.market
    }

    #[must_use]
    pub fn registries(&self) -> &[OddsRegistry] {
        &self.registries
    }

    #[must_use]
    pub const fn bet_ledger(&self) -> &BetLedger {
        &self.bets
    }

    #[must_use]
    pub const fn solvency(&self) -> Solvency {
        self.solvency
    }

    /// Registry of one outcome.
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidOutcome`] when out of range.
    pub fn registry(&self, outcome: u8) -> Result<&OddsRegistry, LedgerError> {
        self.market.check_outcome(outcome)?;
        Ok(&self.registries[usize::from(outcome)])
    }

    /// Quote new wagers on `outcome` lock in.
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidOutcome`] when out of range.
    pub fn current_odds(&self, outcome: u8) -> Result<Option<Quote>, LedgerError> {
        Ok(self.registry(outcome)?.current())
    }

    /// Every distinct quote offered on `outcome`, in first-seen order.
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidOutcome`] when out of range.
    pub fn odds_history(&self, outcome: u8) -> Result<&[Quote], LedgerError> {
        Ok(self.registry(outcome)?.history())
    }

    /// Move the active quote of `outcome`.
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidOutcome`] or [`LedgerError::WrongState`].
    pub fn set_odds(&mut self, outcome: u8, quote: Quote) -> Result<OddsUpdate, LedgerError> {
        self.market.check_outcome(outcome)?;
        self.market.check_accepts_odds()?;
        Ok(self.registries[usize::from(outcome)].set_active(quote))
    }

    pub fn open(&mut self) -> Result<(), LedgerError> {
        self.market.open()
    }

    pub fn suspend(&mut self) -> Result<(), LedgerError> {
        self.market.suspend()
    }

    pub fn resume(&mut self) -> Result<(), LedgerError> {
        self.market.resume()
    }

    pub fn close(&mut self) -> Result<(), LedgerError> {
        self.market.close()
    }

    pub fn cancel(&mut self) -> Result<(), LedgerError> {
        self.market.cancel()
    }

    /// Accept a wager from `owner`.
    ///
    /// # Errors
    /// `BettingClosed`, `InvalidParam`, `InvalidOutcome`, `OddsNotSet` or
    /// `InsufficientReserve`, checked in that order.
    pub fn place(
        &mut self,
        owner: &AccountId,
        outcome: u8,
        stake: Amount,
        now: DateTime<Utc>,
    ) -> Result<Placement, LedgerError> {
        self.market.check_betting_open(now)?;
        if stake <= Decimal::ZERO {
            return Err(LedgerError::invalid("stake", "must be greater than 0"));
        }
        if stake < self.market.min_stake {
            return Err(LedgerError::invalid(
                "stake",
                format!("{stake} is below the minimum of {}", self.market.min_stake),
            ));
        }
        self.market.check_outcome(outcome)?;

        let model = self.market.model;
        let registry = &self.registries[usize::from(outcome)];
        let odds_index = registry.active_index();
        let quote = registry.current();
        if model.requires_odds() && quote.is_none() {
            return Err(LedgerError::OddsNotSet {
                market_id: self.market.id.clone(),
                outcome,
            });
        }

        let too_large = || LedgerError::invalid("stake", format!("{stake} is too large"));
        let liability = model
            .checked_placement_liability(stake, quote.map(|q| q.odds))
            .ok_or_else(too_large)?;
        let pool = self
            .market
            .total_pool
            .checked_add(stake)
            .ok_or_else(too_large)?;
        let fee_term = if model.reserves_fee() {
            bps_of(pool, self.market.fee_bps)
        } else {
            Decimal::ZERO
        };
        self.solvency.check_admission(stake, liability, fee_term)?;

        self.market.record_stake(outcome, stake);
        self.solvency.admit(stake, liability);
        let bet_index = self.bets.append(Bet {
            owner: owner.clone(),
            outcome,
            stake,
            odds_index,
            placed_at: now,
            claimed: false,
            asset: self.market.asset.clone(),
        });

        Ok(Placement {
            bet_index,
            outcome,
            stake,
            odds_index,
            quote,
            liability,
            transfers: vec![Transfer::Receive {
                from: owner.clone(),
                amount: stake,
            }],
        })
    }

    /// Declare `outcome` the winner and freeze the fee.
    ///
    /// Liability is re-priced to what the winning bets will actually be
    /// paid; losing bets never pay, so their liability is released here.
    ///
    /// # Errors
    /// `AlreadySettled`, `InvalidOutcome` or `WrongState`.
    pub fn resolve(&mut self, outcome: u8, now: DateTime<Utc>) -> Result<Resolution, LedgerError> {
        self.market.check_resolvable(outcome, now)?;
        let fee = bps_of(self.market.total_pool, self.market.fee_bps);
        self.market.settle(outcome, fee, now);

        let owed: Amount = self
            .bets
            .iter()
            .filter(|(_, bet)| bet.outcome == outcome && !bet.claimed)
            .map(|(_, bet)| self.payout_of(bet))
            .sum();
        let released = (self.solvency.outstanding_liability - owed).max(Decimal::ZERO);
        self.solvency.outstanding_liability = owed;

        Ok(Resolution {
            winning_outcome: outcome,
            fee,
            winning_pool: self.market.outcome_pool(outcome),
            released_liability: released,
        })
    }

    /// Pay one winning bet.
    ///
    /// # Errors
    /// `NotSettled`, `UnknownBet`, `AlreadyClaimed`, `BetLost` or
    /// `InsufficientReserve`.
    pub fn claim(
        &mut self,
        owner: &AccountId,
        bet_index: usize,
        fee_recipient: &AccountId,
    ) -> Result<Payout, LedgerError> {
        let winning = self.check_settled()?;
        let bet = self
            .bets
            .bet(owner, bet_index)
            .ok_or_else(|| self.unknown_bet(bet_index))?;
        if bet.claimed {
            return Err(LedgerError::AlreadyClaimed {
                market_id: self.market.id.clone(),
                bet_index,
            });
        }
        if bet.outcome != winning {
            return Err(LedgerError::BetLost {
                market_id: self.market.id.clone(),
                bet_index,
            });
        }
        let amount = self.payout_of(bet);
        self.pay_out(owner, vec![bet_index], amount, fee_recipient)
    }

    /// Pay every unclaimed winning bet of `owner` in one release.
    ///
    /// # Errors
    /// `NotSettled`, `NothingToClaim` or `InsufficientReserve`.
    pub fn claim_all(
        &mut self,
        owner: &AccountId,
        fee_recipient: &AccountId,
    ) -> Result<Payout, LedgerError> {
        let winning = self.check_settled()?;
        let (indices, amount) = self
            .bets
            .bets(owner)
            .iter()
            .enumerate()
            .filter(|(_, bet)| bet.outcome == winning && !bet.claimed)
            .fold((Vec::new(), Decimal::ZERO), |(mut indices, total), (index, bet)| {
                indices.push(index);
                (indices, total + self.payout_of(bet))
            });
        if indices.is_empty() {
            return Err(LedgerError::NothingToClaim {
                market_id: self.market.id.clone(),
            });
        }
        self.pay_out(owner, indices, amount, fee_recipient)
    }

    /// Return the stake of a bet on a cancelled market.
    ///
    /// # Errors
    /// `WrongState`, `UnknownBet`, `AlreadyClaimed` or `InsufficientReserve`.
    pub fn refund(&mut self, owner: &AccountId, bet_index: usize) -> Result<Refund, LedgerError> {
        if self.market.state != MarketState::Cancelled {
            return Err(self.market.wrong_state("refund"));
        }
        let bet = self
            .bets
            .bet(owner, bet_index)
            .ok_or_else(|| self.unknown_bet(bet_index))?;
        if bet.claimed {
            return Err(LedgerError::AlreadyClaimed {
                market_id: self.market.id.clone(),
                bet_index,
            });
        }
        let amount = bet.stake;
        let liability = self
            .market
            .model
            .placement_liability(bet.stake, self.locked_odds(bet));

        self.solvency.pay(amount, liability)?;
        if let Some(bet) = self.bets.bet_mut(owner, bet_index) {
            bet.claimed = true;
        }
        Ok(Refund {
            bet_index,
            amount,
            transfers: non_zero([Transfer::Release {
                to: owner.clone(),
                amount,
            }]),
        })
    }

    /// Hand the whole reserve to the fee recipient when nobody won.
    ///
    /// # Errors
    /// `NotSettled`, `WinnersExist` or `NothingToClaim`.
    pub fn sweep(&mut self, fee_recipient: &AccountId) -> Result<ReserveMove, LedgerError> {
        let winning = self.check_settled()?;
        let winning_pool = self.market.outcome_pool(winning);
        if !winning_pool.is_zero() {
            return Err(LedgerError::WinnersExist {
                market_id: self.market.id.clone(),
                winning_pool,
            });
        }
        let amount = self.solvency.reserve_balance;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NothingToClaim {
                market_id: self.market.id.clone(),
            });
        }
        self.solvency = Solvency::default();
        self.market.fee_charged = true;
        Ok(ReserveMove {
            amount,
            transfers: vec![Transfer::Release {
                to: fee_recipient.clone(),
                amount,
            }],
        })
    }

    /// Add operator funds to the reserve.
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidParam`] for a non-positive amount or one
    /// the reserve cannot hold.
    pub fn fund(&mut self, from: &AccountId, amount: Amount) -> Result<ReserveMove, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid("amount", "must be greater than 0"));
        }
        self.solvency.reserve_balance = self
            .solvency
            .reserve_balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::invalid("amount", format!("{amount} is too large")))?;
        Ok(ReserveMove {
            amount,
            transfers: vec![Transfer::Receive {
                from: from.clone(),
                amount,
            }],
        })
    }

    /// Take reserve not needed to back liabilities and the fee.
    ///
    /// # Errors
    /// `InvalidParam` or `SolvencyExceeded`.
    pub fn withdraw(&mut self, to: &AccountId, amount: Amount) -> Result<ReserveMove, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid("amount", "must be greater than 0"));
        }
        let available = self.surplus();
        if amount > available {
            return Err(LedgerError::SolvencyExceeded {
                requested: amount,
                available,
            });
        }
        self.solvency.reserve_balance -= amount;
        Ok(ReserveMove {
            amount,
            transfers: vec![Transfer::Release {
                to: to.clone(),
                amount,
            }],
        })
    }

    /// Reserve the market must keep.
    #[must_use]
    pub fn committed(&self) -> Amount {
        match self.market.state {
            MarketState::Cancelled => self
                .bets
                .iter()
                .filter(|(_, bet)| !bet.claimed)
                .map(|(_, bet)| bet.stake)
                .sum(),
            MarketState::Resolved => {
                let fee = if self.market.fee_charged {
                    Decimal::ZERO
                } else {
                    self.market.fee
                };
                self.solvency.outstanding_liability + fee
            }
            _ => self.solvency.outstanding_liability + self.pending_fee(),
        }
    }

    /// Reserve available for withdrawal.
    #[must_use]
    pub fn surplus(&self) -> Amount {
        self.solvency.surplus(self.committed())
    }

    /// Fee the market will owe on its current pool, where the reserve has to
    /// back it.
    #[must_use]
    pub fn pending_fee(&self) -> Amount {
        if self.market.model.reserves_fee() {
            bps_of(self.market.total_pool, self.market.fee_bps)
        } else {
            Decimal::ZERO
        }
    }

    /// What `owner` could collect right now.
    #[must_use]
    pub fn pending_payout(&self, owner: &AccountId) -> Amount {
        let bets = self.bets.bets(owner).iter().filter(|bet| !bet.claimed);
        match (self.market.state, self.market.winning_outcome) {
            (MarketState::Resolved, Some(winning)) => bets
                .filter(|bet| bet.outcome == winning)
                .map(|bet| self.payout_of(bet))
                .sum(),
            (MarketState::Cancelled, _) => bets.map(|bet| bet.stake).sum(),
            _ => Decimal::ZERO,
        }
    }

    /// The owner's bets with their locked quotes.
    #[must_use]
    pub fn bet_views(&self, owner: &AccountId) -> Vec<BetView> {
        self.bets
            .bets(owner)
            .iter()
            .enumerate()
            .map(|(index, bet)| self.view_of(index, bet))
            .collect()
    }

    /// Every bet on the market.
    #[must_use]
    pub fn all_bet_views(&self) -> Vec<BetView> {
        self.bets
            .iter()
            .map(|(index, bet)| self.view_of(index, bet))
            .collect()
    }

    #[must_use]
    pub fn solvency_view(&self) -> SolvencyView {
        SolvencyView {
            asset: self.market.asset.clone(),
            reserve_balance: self.solvency.reserve_balance,
            outstanding_liability: self.solvency.outstanding_liability,
            total_pool: self.market.total_pool,
        }
    }

    #[must_use]
    pub fn asset(&self) -> &AssetId {
        &self.market.asset
    }

    fn view_of(&self, bet_index: usize, bet: &Bet) -> BetView {
        BetView {
            bet_index,
            owner: bet.owner.clone(),
            outcome: bet.outcome,
            stake: bet.stake,
            odds_index: bet.odds_index,
            quote: bet
                .odds_index
                .and_then(|index| self.registries.get(usize::from(bet.outcome))?.get(index)),
            placed_at: bet.placed_at,
            claimed: bet.claimed,
        }
    }

    fn check_settled(&self) -> Result<u8, LedgerError> {
        match (self.market.state, self.market.winning_outcome) {
            (MarketState::Resolved, Some(winning)) => Ok(winning),
            _ => Err(LedgerError::NotSettled {
                market_id: self.market.id.clone(),
            }),
        }
    }

    fn unknown_bet(&self, bet_index: usize) -> LedgerError {
        LedgerError::UnknownBet {
            market_id: self.market.id.clone(),
            bet_index,
        }
    }

    fn locked_odds(&self, bet: &Bet) -> Option<Odds> {
        let index = bet.odds_index?;
        self.registries
            .get(usize::from(bet.outcome))?
            .get(index)
            .map(|quote| quote.odds)
    }

    fn pool_share(&self) -> PoolShare {
        PoolShare {
            total_pool: self.market.total_pool,
            winning_pool: self
                .market
                .winning_outcome
                .map_or(Decimal::ZERO, |winning| self.market.outcome_pool(winning)),
            fee: self.market.fee,
        }
    }

    fn payout_of(&self, bet: &Bet) -> Amount {
        self.market
            .model
            .payout(bet.stake, self.locked_odds(bet), &self.pool_share())
    }

    /// Commit a payout of `amount` across `indices`, charging the fee if
    /// this is the market's first claim.
    fn pay_out(
        &mut self,
        owner: &AccountId,
        indices: Vec<usize>,
        amount: Amount,
        fee_recipient: &AccountId,
    ) -> Result<Payout, LedgerError> {
        let fee = if self.market.fee_charged {
            Decimal::ZERO
        } else {
            self.market.fee
        };
        let needed = amount + fee;
        if self.solvency.reserve_balance < needed {
            return Err(LedgerError::InsufficientReserve {
                required: needed,
                available: self.solvency.reserve_balance,
            });
        }

        self.solvency.pay(amount, amount)?;
        self.solvency.reserve_balance -= fee;
        self.market.fee_charged = true;
        for &index in &indices {
            if let Some(bet) = self.bets.bet_mut(owner, index) {
                bet.claimed = true;
            }
        }

        Ok(Payout {
            bet_indices: indices,
            amount,
            fee,
            transfers: non_zero([
                Transfer::Release {
                    to: owner.clone(),
                    amount,
                },
                Transfer::Release {
                    to: fee_recipient.clone(),
                    amount: fee,
                },
            ]),
        })
    }
}
