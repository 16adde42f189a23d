//! Handlers for the `odds` command group.

use serde_json::json;
use tabled::Tabled;

use super::command::{OddsSetArgs, OutcomeArgs};
use super::output;
use super::run::{market_id, Session};
use crate::domain::Quote;
use crate::error::Result;

#[derive(Tabled)]
struct QuoteRow {
    #[tabled(rename = "Index")]
    index: usize,
    #[tabled(rename = "Odds")]
    odds: String,
    #[tabled(rename = "Line")]
    line: String,
    #[tabled(rename = "Active")]
    active: &'static str,
}

/// Execute `odds set`.
pub fn set(session: &Session, args: OddsSetArgs) -> Result<()> {
    let id = market_id(&args.market);
    let quote = Quote {
        odds: args.odds,
        line: args.line,
    };
    let update = session
        .engine()
        .set_active_odds(&session.caller, &id, args.outcome, quote)?;

    if output::is_json() {
        return output::json_result(
            "odds.set",
            &json!({
                "market_id": id,
                "outcome": args.outcome,
                "quote": quote,
                "index": update.index,
                "appended": update.appended,
            }),
        );
    }
    let note = if update.appended { "new entry" } else { "reused" };
    output::success(&format!(
        "Outcome {} on {id} now quotes {} ({} {note})",
        args.outcome,
        output::highlight(quote),
        update.index
    ));
    Ok(())
}

/// Execute `odds history`.
pub fn history(session: &Session, args: &OutcomeArgs) -> Result<()> {
    let id = market_id(&args.market);
    let history = session.engine().odds_history(&id, args.outcome)?;
    let current = session.engine().current_odds(&id, args.outcome)?;

    if output::is_json() {
        return output::json_result(
            "odds.history",
            &json!({
                "market_id": id,
                "outcome": args.outcome,
                "history": history,
                "current": current,
            }),
        );
    }
    output::section(&format!("Odds history for outcome {} on {id}", args.outcome));
    let rows = history
        .iter()
        .enumerate()
        .map(|(slot, quote)| QuoteRow {
            index: slot + 1,
            odds: quote.odds.to_string(),
            line: quote.line.map_or_else(|| "-".to_string(), |line| line.to_string()),
            active: if Some(*quote) == current { "*" } else { "" },
        })
        .collect();
    output::table(rows, "No odds set.");
    Ok(())
}
