//! Handlers for the `settle` command group.

use serde_json::json;

use super::command::{BetArg, OutcomeArgs};
use super::output;
use super::run::{market_id, Session};
use crate::domain::Payout;
use crate::error::Result;

/// Execute `settle resolve`.
pub fn resolve(session: &Session, args: &OutcomeArgs) -> Result<()> {
    let id = market_id(&args.market);
    let resolution = session
        .engine()
        .resolve(&session.caller, &id, args.outcome)?;

    if output::is_json() {
        return output::json_result(
            "settle.resolve",
            &json!({ "market_id": id, "resolution": resolution }),
        );
    }
    output::success(&format!(
        "Market {id} resolved to outcome {}",
        output::highlight(resolution.winning_outcome)
    ));
    output::field("Winning pool", resolution.winning_pool);
    output::field("Fee", resolution.fee);
    output::field("Released", resolution.released_liability);
    Ok(())
}

/// Execute `settle claim`.
pub fn claim(session: &Session, arg: &BetArg) -> Result<()> {
    let id = market_id(&arg.market);
    let payout = session
        .engine()
        .claim(&session.caller, &id, arg.bet_index)?;
    report_payout(session, "settle.claim", &id.to_string(), &payout)
}

/// Execute `settle claim-all`.
pub fn claim_all(session: &Session, market: &str) -> Result<()> {
    let id = market_id(market);
    let payout = session.engine().claim_all(&session.caller, &id)?;
    report_payout(session, "settle.claim_all", market, &payout)
}

fn report_payout(session: &Session, command: &str, market: &str, payout: &Payout) -> Result<()> {
    if output::is_json() {
        return output::json_result(
            command,
            &json!({
                "market_id": market,
                "owner": session.caller,
                "payout": payout,
            }),
        );
    }
    output::success(&format!(
        "Paid {} to {} for {} bet(s) on {market}",
        output::positive(payout.amount),
        session.caller,
        payout.bet_indices.len()
    ));
    if !payout.fee.is_zero() {
        output::field("Fee charged", payout.fee);
    }
    Ok(())
}

/// Execute `settle refund`.
pub fn refund(session: &Session, arg: &BetArg) -> Result<()> {
    let id = market_id(&arg.market);
    let refund = session
        .engine()
        .claim_refund(&session.caller, &id, arg.bet_index)?;

    if output::is_json() {
        return output::json_result(
            "settle.refund",
            &json!({ "market_id": id, "owner": session.caller, "refund": refund }),
        );
    }
    output::success(&format!(
        "Refunded {} for bet #{} on {id}",
        output::positive(refund.amount),
        refund.bet_index
    ));
    Ok(())
}

/// Execute `settle sweep`.
pub fn sweep(session: &Session, market: &str) -> Result<()> {
    let id = market_id(market);
    let swept = session
        .engine()
        .sweep_if_no_winners(&session.caller, &id)?;

    if output::is_json() {
        return output::json_result(
            "settle.sweep",
            &json!({
                "market_id": id,
                "recipient": session.engine().settings().fee_recipient,
                "sweep": swept,
            }),
        );
    }
    output::success(&format!(
        "Swept {} from {id} to {}",
        output::positive(swept.amount),
        session.engine().settings().fee_recipient
    ));
    Ok(())
}
