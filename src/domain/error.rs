//! Ledger errors.
//!
//! Every rejected ledger call returns one of these, and a rejected call
//! leaves the ledger exactly as it was. [`LedgerError::kind`] groups the
//! variants so callers can decide whether a retry makes sense.
//!
//! # Examples
//!
//! ```
//! use oddsledger::domain::error::{ErrorKind, LedgerError};
//! use oddsledger::domain::money::Odds;
//!
//! let err = Odds::try_new(5_000).unwrap_err();
//! assert!(matches!(err, LedgerError::OddsOutOfRange { value: 5_000 }));
//! assert_eq!(err.kind(), ErrorKind::Validation);
//! ```

use thiserror::Error;

use super::access::Action;
use super::id::{AccountId, MarketId};
use super::market::MarketState;
use super::money::Amount;

/// Coarse classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input; retry with corrected input.
    Validation,
    /// Valid request at the wrong lifecycle stage.
    State,
    /// Business-rule violation; terminal for this call.
    Ledger,
    /// A fund movement failed and the operation was rolled back.
    External,
    /// The caller lacks the required authority.
    Authorization,
}

/// Errors raised by ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Odds value outside 1.0001x..=100.00x.
    #[error("odds {value} out of range")]
    OddsOutOfRange {
        /// The rejected fixed-point value.
        value: u32,
    },

    /// Outcome index not valid for the market.
    #[error("invalid outcome {outcome}: market has {outcome_count} outcomes")]
    InvalidOutcome { outcome: u8, outcome_count: u8 },

    /// A parameter failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidParam { field: &'static str, reason: String },

    /// More outcomes than a market supports.
    #[error("too many outcomes: {count} > {max}")]
    TooManyOutcomes { count: usize, max: u8 },

    /// No odds have been set for the outcome.
    #[error("no odds set for outcome {outcome} on market {market_id}")]
    OddsNotSet { market_id: MarketId, outcome: u8 },

    /// The market is not taking wagers.
    #[error("betting closed on market {market_id}")]
    BettingClosed { market_id: MarketId },

    /// The market has already been resolved.
    #[error("market {market_id} already settled")]
    AlreadySettled { market_id: MarketId },

    /// The market has not been resolved yet.
    #[error("market {market_id} not settled")]
    NotSettled { market_id: MarketId },

    /// The operation is not allowed in the market's current state.
    #[error("cannot {operation} market {market_id} in state {state}")]
    WrongState {
        market_id: MarketId,
        state: MarketState,
        operation: &'static str,
    },

    /// The pause switch is set.
    #[error("ledger is paused")]
    Paused,

    /// A settlement on the same market is already in flight.
    #[error("settlement already in progress on market {market_id}")]
    Reentrant { market_id: MarketId },

    /// No market with this id.
    #[error("unknown market {market_id}")]
    UnknownMarket { market_id: MarketId },

    /// A market with this id already exists.
    #[error("market {market_id} already exists")]
    MarketExists { market_id: MarketId },

    /// The bet has already been paid or refunded.
    #[error("bet {bet_index} on market {market_id} already claimed")]
    AlreadyClaimed { market_id: MarketId, bet_index: usize },

    /// The bet is on a losing outcome.
    #[error("bet {bet_index} on market {market_id} lost")]
    BetLost { market_id: MarketId, bet_index: usize },

    /// Nothing is claimable.
    #[error("nothing to claim on market {market_id}")]
    NothingToClaim { market_id: MarketId },

    /// Accepting the wager would leave liabilities uncovered.
    #[error("insufficient reserve: required {required}, available {available}")]
    InsufficientReserve { required: Amount, available: Amount },

    /// A withdrawal would dip into funds that back liabilities.
    #[error("solvency exceeded: requested {requested}, surplus {available}")]
    SolvencyExceeded { requested: Amount, available: Amount },

    /// Stake exists on the winning outcome, so the reserve cannot be swept.
    #[error("market {market_id} has {winning_pool} staked on the winning outcome")]
    WinnersExist {
        market_id: MarketId,
        winning_pool: Amount,
    },

    /// No bet at this index for the caller.
    #[error("no bet {bet_index} on market {market_id}")]
    UnknownBet { market_id: MarketId, bet_index: usize },

    /// The settlement asset adapter refused the transfer.
    #[error("transfer failed: {reason}")]
    TransferFailed { reason: String },

    /// The access policy denied the action.
    #[error("{caller} is not authorized to {action}")]
    Unauthorized { caller: AccountId, action: Action },
}

impl LedgerError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::OddsOutOfRange { .. }
            | Self::InvalidOutcome { .. }
            | Self::InvalidParam { .. }
            | Self::TooManyOutcomes { .. }
            | Self::OddsNotSet { .. } => ErrorKind::Validation,
            Self::BettingClosed { .. }
            | Self::AlreadySettled { .. }
            | Self::NotSettled { .. }
            | Self::WrongState { .. }
            | Self::Paused
            | Self::Reentrant { .. }
            | Self::UnknownMarket { .. }
            | Self::MarketExists { .. } => ErrorKind::State,
            Self::AlreadyClaimed { .. }
            | Self::BetLost { .. }
            | Self::NothingToClaim { .. }
            | Self::InsufficientReserve { .. }
            | Self::SolvencyExceeded { .. }
            | Self::WinnersExist { .. }
            | Self::UnknownBet { .. } => ErrorKind::Ledger,
            Self::TransferFailed { .. } => ErrorKind::External,
            Self::Unauthorized { .. } => ErrorKind::Authorization,
        }
    }

    /// Shorthand for [`LedgerError::InvalidParam`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            field,
            reason: reason.into(),
        }
    }
}
