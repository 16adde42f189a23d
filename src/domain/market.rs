//! Market lifecycle and pool totals.
//!
//! ```text
//! Inactive --open--> Open --suspend--> Suspended --resume--> Open
//! Open --close--> Closed --resolve--> Resolved
//! {Inactive, Open, Suspended, Closed} --cancel--> Cancelled
//! ```
//!
//! `Resolved` and `Cancelled` are terminal.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::id::{AssetId, MarketId};
use super::money::{Amount, Odds, MAX_FEE_BPS};
use super::payout::PayoutModel;

/// Smallest number of outcomes a market may have.
pub const MIN_OUTCOMES: u8 = 2;

/// Largest number of outcomes a market may have.
pub const MAX_OUTCOMES: u8 = 16;

/// Lifecycle stage of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketState {
    Inactive,
    Open,
    Suspended,
    Closed,
    Resolved,
    Cancelled,
}

impl MarketState {
    /// Stable name used in storage and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Open => "open",
            Self::Suspended => "suspended",
            Self::Closed => "closed",
            Self::Resolved => "resolved",
            Self::Cancelled => "cancelled",
        }
    }

    /// True for `Resolved` and `Cancelled`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Cancelled)
    }

    /// Odds may move only before the market closes.
    #[must_use]
    pub const fn accepts_odds(self) -> bool {
        matches!(self, Self::Inactive | Self::Open | Self::Suspended)
    }
}

impl fmt::Display for MarketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketState {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inactive" => Ok(Self::Inactive),
            "open" => Ok(Self::Open),
            "suspended" => Ok(Self::Suspended),
            "closed" => Ok(Self::Closed),
            "resolved" => Ok(Self::Resolved),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(LedgerError::invalid(
                "state",
                format!("unknown market state '{other}'"),
            )),
        }
    }
}

/// Parameters for creating a market.
#[derive(Debug, Clone)]
pub struct NewMarket {
    pub id: MarketId,
    pub question: String,
    pub outcome_count: u8,
    pub asset: AssetId,
    pub model: PayoutModel,
    pub fee_bps: u16,
    pub min_stake: Amount,
    pub betting_cutoff: Option<DateTime<Utc>>,
    /// Opening odds, one per outcome, or empty.
    pub initial_odds: Vec<Odds>,
}

impl NewMarket {
    /// Fixed-odds market with defaults for everything but the outcomes.
    pub fn fixed_odds(
        id: impl Into<MarketId>,
        asset: impl Into<AssetId>,
        initial_odds: Vec<Odds>,
    ) -> Self {
        Self {
            id: id.into(),
            question: String::new(),
            outcome_count: u8::try_from(initial_odds.len()).unwrap_or(u8::MAX),
            asset: asset.into(),
            model: PayoutModel::FixedOdds,
            fee_bps: 0,
            min_stake: Decimal::ZERO,
            betting_cutoff: None,
            initial_odds,
        }
    }

    /// Parimutuel market without opening odds.
    pub fn parimutuel(
        id: impl Into<MarketId>,
        asset: impl Into<AssetId>,
        outcome_count: u8,
    ) -> Self {
        Self {
            id: id.into(),
            question: String::new(),
            outcome_count,
            asset: asset.into(),
            model: PayoutModel::Parimutuel,
            fee_bps: 0,
            min_stake: Decimal::ZERO,
            betting_cutoff: None,
            initial_odds: Vec::new(),
        }
    }

    /// Validate creation parameters.
    ///
    /// # Errors
    /// Returns a validation [`LedgerError`] for the first bad parameter.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.id.as_str().trim().is_empty() {
            return Err(LedgerError::invalid("id", "must not be empty"));
        }
        if self.outcome_count > MAX_OUTCOMES {
            return Err(LedgerError::TooManyOutcomes {
                count: usize::from(self.outcome_count),
                max: MAX_OUTCOMES,
            });
        }
        if self.outcome_count < MIN_OUTCOMES {
            return Err(LedgerError::invalid(
                "outcome_count",
                format!("need at least {MIN_OUTCOMES} outcomes"),
            ));
        }
        if !self.initial_odds.is_empty()
            && self.initial_odds.len() != usize::from(self.outcome_count)
        {
            return Err(LedgerError::invalid(
                "initial_odds",
                format!(
                    "expected {} values, got {}",
                    self.outcome_count,
                    self.initial_odds.len()
                ),
            ));
        }
        if self.fee_bps > MAX_FEE_BPS {
            return Err(LedgerError::invalid(
                "fee_bps",
                format!("{} exceeds cap of {MAX_FEE_BPS}", self.fee_bps),
            ));
        }
        if self.min_stake < Decimal::ZERO {
            return Err(LedgerError::invalid("min_stake", "must be 0 or greater"));
        }
        if self.asset.as_str().trim().is_empty() {
            return Err(LedgerError::invalid("asset", "must not be empty"));
        }
        Ok(())
    }
}

/// A single wagering event and its pool totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub(crate) id: MarketId,
    pub(crate) question: String,
    pub(crate) outcome_count: u8,
    pub(crate) state: MarketState,
    pub(crate) winning_outcome: Option<u8>,
    pub(crate) total_pool: Amount,
    pub(crate) outcome_pools: Vec<Amount>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) resolved_at: Option<DateTime<Utc>>,
    pub(crate) asset: AssetId,
    pub(crate) model: PayoutModel,
    pub(crate) fee_bps: u16,
    pub(crate) fee: Amount,
    pub(crate) fee_charged: bool,
    pub(crate) betting_cutoff: Option<DateTime<Utc>>,
    pub(crate) min_stake: Amount,
}

impl Market {
    /// Create an `Inactive` market from validated parameters.
    pub(crate) fn new(spec: &NewMarket, now: DateTime<Utc>) -> Self {
        Self {
            id: spec.id.clone(),
            question: spec.question.clone(),
            outcome_count: spec.outcome_count,
            state: MarketState::Inactive,
            winning_outcome: None,
            total_pool: Decimal::ZERO,
            outcome_pools: vec![Decimal::ZERO; usize::from(spec.outcome_count)],
            created_at: now,
            resolved_at: None,
            asset: spec.asset.clone(),
            model: spec.model,
            fee_bps: spec.fee_bps,
            fee: Decimal::ZERO,
            fee_charged: false,
            betting_cutoff: spec.betting_cutoff,
            min_stake: spec.min_stake,
        }
    }

    #[must_use]
    pub fn id(&self) -> &MarketId {
        &self.id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub const fn outcome_count(&self) -> u8 {
        self.outcome_count
    }

    #[must_use]
    pub const fn state(&self) -> MarketState {
        self.state
    }

    /// The winning outcome; `None` unless the market is `Resolved`.
    #[must_use]
    pub fn winning_outcome(&self) -> Option<u8> {
        match self.state {
            MarketState::Resolved => self.winning_outcome,
            _ => None,
        }
    }

    /// Sum of every stake placed on the market.
    #[must_use]
    pub const fn total_pool(&self) -> Amount {
        self.total_pool
    }

    /// Stake placed on one outcome.
    #[must_use]
    pub fn outcome_pool(&self, outcome: u8) -> Amount {
        self.outcome_pools
            .get(usize::from(outcome))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn outcome_pools(&self) -> &[Amount] {
        &self.outcome_pools
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    #[must_use]
    pub fn asset(&self) -> &AssetId {
        &self.asset
    }

    #[must_use]
    pub const fn model(&self) -> PayoutModel {
        self.model
    }

    #[must_use]
    pub const fn fee_bps(&self) -> u16 {
        self.fee_bps
    }

    /// Fee frozen at resolution.
    #[must_use]
    pub const fn fee(&self) -> Amount {
        self.fee
    }

    /// Whether the fee has left the reserve.
    #[must_use]
    pub const fn fee_charged(&self) -> bool {
        self.fee_charged
    }

    #[must_use]
    pub const fn betting_cutoff(&self) -> Option<DateTime<Utc>> {
        self.betting_cutoff
    }

    #[must_use]
    pub const fn min_stake(&self) -> Amount {
        self.min_stake
    }

    /// True once the betting cutoff has passed.
    #[must_use]
    pub fn cutoff_passed(&self, now: DateTime<Utc>) -> bool {
        self.betting_cutoff.is_some_and(|cutoff| now >= cutoff)
    }

    /// Check an outcome index.
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidOutcome`] when out of range.
    pub fn check_outcome(&self, outcome: u8) -> Result<(), LedgerError> {
        if outcome >= self.outcome_count {
            return Err(LedgerError::InvalidOutcome {
                outcome,
                outcome_count: self.outcome_count,
            });
        }
        Ok(())
    }

    /// Check that a wager may be placed now.
    ///
    /// # Errors
    /// Returns [`LedgerError::BettingClosed`] outside `Open` or past the cutoff.
    pub fn check_betting_open(&self, now: DateTime<Utc>) -> Result<(), LedgerError> {
        if self.state != MarketState::Open || self.cutoff_passed(now) {
            return Err(LedgerError::BettingClosed {
                market_id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Check that odds may move.
    ///
    /// # Errors
    /// Returns [`LedgerError::WrongState`] once the market has closed.
    pub fn check_accepts_odds(&self) -> Result<(), LedgerError> {
        if !self.state.accepts_odds() {
            return Err(self.wrong_state("set odds on"));
        }
        Ok(())
    }

    /// `Inactive -> Open`.
    pub(crate) fn open(&mut self) -> Result<(), LedgerError> {
        self.transition(&[MarketState::Inactive], MarketState::Open, "open")
    }

    /// `Open -> Suspended`.
    pub(crate) fn suspend(&mut self) -> Result<(), LedgerError> {
        self.transition(&[MarketState::Open], MarketState::Suspended, "suspend")
    }

    /// `Suspended -> Open`.
    pub(crate) fn resume(&mut self) -> Result<(), LedgerError> {
        self.transition(&[MarketState::Suspended], MarketState::Open, "resume")
    }

    /// `Open -> Closed`.
    pub(crate) fn close(&mut self) -> Result<(), LedgerError> {
        self.transition(&[MarketState::Open], MarketState::Closed, "close")
    }

    /// Any non-terminal state `-> Cancelled`.
    pub(crate) fn cancel(&mut self) -> Result<(), LedgerError> {
        if self.state == MarketState::Resolved {
            return Err(LedgerError::AlreadySettled {
                market_id: self.id.clone(),
            });
        }
        self.transition(
            &[
                MarketState::Inactive,
                MarketState::Open,
                MarketState::Suspended,
                MarketState::Closed,
            ],
            MarketState::Cancelled,
            "cancel",
        )
    }

    /// Check that the market may resolve to `outcome` at `now`.
    ///
    /// `Closed` markets resolve; `Open` markets resolve only once their
    /// betting cutoff has passed.
    pub(crate) fn check_resolvable(
        &self,
        outcome: u8,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        if self.state == MarketState::Resolved {
            return Err(LedgerError::AlreadySettled {
                market_id: self.id.clone(),
            });
        }
        self.check_outcome(outcome)?;
        match self.state {
            MarketState::Closed => Ok(()),
            MarketState::Open if self.cutoff_passed(now) => Ok(()),
            _ => Err(self.wrong_state("resolve")),
        }
    }

    /// Freeze the market as `Resolved`. Call [`Market::check_resolvable`] first.
    pub(crate) fn settle(&mut self, outcome: u8, fee: Amount, now: DateTime<Utc>) {
        self.state = MarketState::Resolved;
        self.winning_outcome = Some(outcome);
        self.fee = fee;
        self.resolved_at = Some(now);
    }

    /// Add a stake to the pools. The market must be `Open`.
    pub(crate) fn record_stake(&mut self, outcome: u8, stake: Amount) {
        debug_assert_eq!(self.state, MarketState::Open);
        self.total_pool += stake;
        if let Some(pool) = self.outcome_pools.get_mut(usize::from(outcome)) {
            *pool += stake;
        }
    }

    pub(crate) fn wrong_state(&self, operation: &'static str) -> LedgerError {
        LedgerError::WrongState {
            market_id: self.id.clone(),
            state: self.state,
            operation,
        }
    }

    fn transition(
        &mut self,
        from: &[MarketState],
        to: MarketState,
        operation: &'static str,
    ) -> Result<(), LedgerError> {
        if !from.contains(&self.state) {
            return Err(self.wrong_state(operation));
        }
        self.state = to;
        Ok(())
    }
}
