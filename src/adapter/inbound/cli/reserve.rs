//! Handlers for the `reserve` command group.

use serde_json::json;

use super::command::ReserveMoveArgs;
use super::output;
use super::run::{market_id, Session};
use crate::domain::{AccountId, AssetId, SolvencyView};
use crate::error::Result;

fn counterparty(session: &Session, args: &ReserveMoveArgs) -> AccountId {
    args.account
        .as_deref()
        .map_or_else(|| session.caller.clone(), AccountId::new)
}

/// Execute `reserve fund`.
pub fn fund(session: &Session, args: &ReserveMoveArgs) -> Result<()> {
    let id = market_id(&args.market);
    let from = counterparty(session, args);
    let funded = session
        .engine()
        .fund_reserve(&session.caller, &id, &from, args.amount)?;

    if output::is_json() {
        return output::json_result(
            "reserve.fund",
            &json!({ "market_id": id, "account": from, "move": funded }),
        );
    }
    output::success(&format!(
        "Funded {id} with {} from {from}",
        output::positive(funded.amount)
    ));
    Ok(())
}

/// Execute `reserve withdraw`.
pub fn withdraw(session: &Session, args: &ReserveMoveArgs) -> Result<()> {
    let id = market_id(&args.market);
    let to = counterparty(session, args);
    let withdrawn = session
        .engine()
        .withdraw_surplus(&session.caller, &id, &to, args.amount)?;

    if output::is_json() {
        return output::json_result(
            "reserve.withdraw",
            &json!({ "market_id": id, "account": to, "move": withdrawn }),
        );
    }
    output::success(&format!(
        "Withdrew {} from {id} to {to}",
        output::negative(withdrawn.amount)
    ));
    Ok(())
}

/// Execute `reserve show`.
pub fn show(session: &Session, market: &str) -> Result<()> {
    let id = market_id(market);
    let view = session.engine().solvency(&id)?;
    if output::is_json() {
        return output::json_result("reserve.show", &json!({ "market_id": id, "solvency": view }));
    }
    output::section(&format!("Reserve for {id}"));
    display(&view);
    Ok(())
}

/// Execute `reserve asset`.
pub fn asset(session: &Session, asset: &str) -> Result<()> {
    let view = session.engine().asset_solvency(&AssetId::new(asset));
    if output::is_json() {
        return output::json_result("reserve.asset", &view);
    }
    output::section(&format!("Reserve across {asset}"));
    display(&view);
    Ok(())
}

fn display(view: &SolvencyView) {
    output::field("Asset", &view.asset);
    output::field("Reserve", view.reserve_balance);
    output::field("Liability", view.outstanding_liability);
    output::field("Pool", view.total_pool);
    let covered = if view.is_covered() {
        output::positive("covered")
    } else {
        output::negative("UNDER-RESERVED")
    };
    output::field("Status", covered);
}
