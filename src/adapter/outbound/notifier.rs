//! Notification adapters.
//!
//! Implements the `port::Notifier` trait on top of `tracing`.

use tracing::info;

use crate::port::outbound::notifier::{LedgerEvent, Notifier};

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &LedgerEvent) {
        match event {
            LedgerEvent::MarketCreated {
                market_id,
                asset,
                model,
                outcome_count,
            } => {
                info!(
                    market_id = %market_id,
                    asset = %asset,
                    model = %model,
                    outcomes = outcome_count,
                    "Market created"
                );
            }
            LedgerEvent::OddsChanged {
                market_id,
                outcome,
                index,
                quote,
                appended,
            } => {
                info!(
                    market_id = %market_id,
                    outcome = outcome,
                    index = %index,
                    quote = %quote,
                    appended = appended,
                    "Odds changed"
                );
            }
            LedgerEvent::MarketStateChanged {
                market_id,
                from,
                to,
            } => {
                info!(market_id = %market_id, from = %from, to = %to, "Market state changed");
            }
            LedgerEvent::BetPlaced(e) => {
                info!(
                    market_id = %e.market_id,
                    owner = %e.owner,
                    bet_index = e.bet_index,
                    outcome = e.outcome,
                    stake = %e.stake,
                    "Bet placed"
                );
            }
            LedgerEvent::MarketResolved {
                market_id,
                winning_outcome,
                fee,
                winning_pool,
            } => {
                info!(
                    market_id = %market_id,
                    winning_outcome = winning_outcome,
                    fee = %fee,
                    winning_pool = %winning_pool,
                    "Market resolved"
                );
            }
            LedgerEvent::Claimed {
                market_id,
                owner,
                bet_indices,
                amount,
                fee,
            } => {
                info!(
                    market_id = %market_id,
                    owner = %owner,
                    bets = bet_indices.len(),
                    amount = %amount,
                    fee = %fee,
                    "Claimed"
                );
            }
            LedgerEvent::Refunded {
                market_id,
                owner,
                bet_index,
                amount,
            } => {
                info!(
                    market_id = %market_id,
                    owner = %owner,
                    bet_index = bet_index,
                    amount = %amount,
                    "Refunded"
                );
            }
            LedgerEvent::Swept {
                market_id,
                recipient,
                amount,
            } => {
                info!(market_id = %market_id, recipient = %recipient, amount = %amount, "Swept");
            }
            LedgerEvent::ReserveFunded {
                market_id,
                account,
                amount,
            } => {
                info!(
                    market_id = %market_id,
                    account = %account,
                    amount = %amount,
                    "Reserve funded"
                );
            }
            LedgerEvent::ReserveWithdrawn {
                market_id,
                account,
                amount,
            } => {
                info!(
                    market_id = %market_id,
                    account = %account,
                    amount = %amount,
                    "Reserve withdrawn"
                );
            }
            LedgerEvent::PauseChanged { paused, by } => {
                info!(paused = paused, by = %by, "Pause changed");
            }
        }
    }
}
