//! Handlers for the `bet` command group.

use serde_json::json;
use tabled::Tabled;

use super::command::{BetListArgs, BetPlaceArgs};
use super::output;
use super::run::{market_id, Session};
use crate::domain::{AccountId, BetView};
use crate::error::Result;

#[derive(Tabled)]
struct BetRow {
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Outcome")]
    outcome: u8,
    #[tabled(rename = "Stake")]
    stake: String,
    #[tabled(rename = "Odds")]
    odds: String,
    #[tabled(rename = "Claimed")]
    claimed: &'static str,
}

impl From<&BetView> for BetRow {
    fn from(bet: &BetView) -> Self {
        Self {
            owner: bet.owner.to_string(),
            index: bet.bet_index,
            outcome: bet.outcome,
            stake: bet.stake.to_string(),
            odds: bet.quote.map_or_else(|| "pool".to_string(), |quote| quote.to_string()),
            claimed: if bet.claimed { "yes" } else { "no" },
        }
    }
}

/// Execute `bet place`. The caller owns the bet.
pub fn place(session: &Session, args: &BetPlaceArgs) -> Result<()> {
    let id = market_id(&args.market);
    let placement = session
        .engine()
        .place(&session.caller, &id, args.outcome, args.stake)?;

    if output::is_json() {
        return output::json_result(
            "bet.place",
            &json!({
                "market_id": id,
                "owner": session.caller,
                "placement": placement,
            }),
        );
    }
    output::success(&format!(
        "Bet #{} placed on outcome {} of {id}",
        placement.bet_index, placement.outcome
    ));
    output::field("Stake", placement.stake);
    if let Some(quote) = placement.quote {
        output::field("Odds", quote);
    }
    output::field("Liability", placement.liability);
    Ok(())
}

/// Execute `bet list`.
pub fn list(session: &Session, args: &BetListArgs) -> Result<()> {
    let id = market_id(&args.market);
    let bets = match &args.owner {
        Some(owner) => session.engine().bets(&id, &AccountId::new(owner.as_str()))?,
        None => session.engine().book(&id)?.all_bet_views(),
    };

    if output::is_json() {
        return output::json_result("bet.list", &json!({ "market_id": id, "bets": bets }));
    }
    output::table(bets.iter().map(BetRow::from).collect(), "No bets.");
    Ok(())
}
