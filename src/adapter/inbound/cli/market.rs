//! Handlers for the `market` command group.

use serde_json::json;
use tabled::Tabled;

use super::command::MarketCreateArgs;
use super::output;
use super::run::{market_id, Session};
use crate::domain::{Market, MarketId, NewMarket, PayoutModel};
use crate::error::Result;

#[derive(Tabled)]
struct MarketRow {
    #[tabled(rename = "Market")]
    id: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Outcomes")]
    outcomes: u8,
    #[tabled(rename = "Pool")]
    pool: String,
}

impl From<&Market> for MarketRow {
    fn from(market: &Market) -> Self {
        Self {
            id: market.id().to_string(),
            state: market.state().to_string(),
            model: market.model().to_string(),
            asset: market.asset().to_string(),
            outcomes: market.outcome_count(),
            pool: market.total_pool().to_string(),
        }
    }
}

/// Execute `market create`.
pub fn create(session: &Session, args: MarketCreateArgs) -> Result<()> {
    let id = args.id.map_or_else(MarketId::generate, MarketId::new);
    let mut spec = match PayoutModel::from(args.model) {
        PayoutModel::FixedOdds => NewMarket::fixed_odds(id, args.asset.as_str(), args.odds),
        PayoutModel::Parimutuel => {
            let mut spec =
                NewMarket::parimutuel(id, args.asset.as_str(), args.outcomes.unwrap_or(2));
            spec.initial_odds = args.odds;
            spec
        }
    };
    if let Some(outcomes) = args.outcomes {
        spec.outcome_count = outcomes;
    }
    spec.question = args.question;
    spec.fee_bps = args.fee_bps.unwrap_or(session.config.ledger.fee_bps);
    spec.min_stake = args.min_stake.unwrap_or(session.config.ledger.min_stake);
    spec.betting_cutoff = args.cutoff;

    let market_id = session.engine().create_market(&session.caller, spec)?;
    let market = session.engine().market(&market_id)?;

    if output::is_json() {
        return output::json_result("market.create", &market);
    }
    output::success(&format!("Created market {}", output::highlight(&market_id)));
    describe(&market);
    Ok(())
}

/// Execute `market open`.
pub fn open(session: &Session, market: &str) -> Result<()> {
    transition(session, market, "open", Lifecycle::Open)
}

/// Execute `market suspend`.
pub fn suspend(session: &Session, market: &str) -> Result<()> {
    transition(session, market, "suspend", Lifecycle::Suspend)
}

/// Execute `market resume`.
pub fn resume(session: &Session, market: &str) -> Result<()> {
    transition(session, market, "resume", Lifecycle::Resume)
}

/// Execute `market close`.
pub fn close(session: &Session, market: &str) -> Result<()> {
    transition(session, market, "close", Lifecycle::Close)
}

/// Execute `market cancel`.
pub fn cancel(session: &Session, market: &str) -> Result<()> {
    transition(session, market, "cancel", Lifecycle::Cancel)
}

#[derive(Clone, Copy)]
enum Lifecycle {
    Open,
    Suspend,
    Resume,
    Close,
    Cancel,
}

fn transition(session: &Session, market: &str, verb: &str, op: Lifecycle) -> Result<()> {
    let id = market_id(market);
    let engine = session.engine();
    let caller = &session.caller;
    match op {
        Lifecycle::Open => engine.open_market(caller, &id)?,
        Lifecycle::Suspend => engine.suspend_market(caller, &id)?,
        Lifecycle::Resume => engine.resume_market(caller, &id)?,
        Lifecycle::Close => engine.close_market(caller, &id)?,
        Lifecycle::Cancel => engine.cancel_market(caller, &id)?,
    }
    let market = engine.market(&id)?;
    if output::is_json() {
        return output::json_result(
            &format!("market.{verb}"),
            &json!({
                "market_id": id,
                "state": market.state(),
            }),
        );
    }
    output::success(&format!(
        "Market {id} is now {}",
        output::highlight(market.state())
    ));
    Ok(())
}

/// Execute `market show`.
pub fn show(session: &Session, market: &str) -> Result<()> {
    let id = market_id(market);
    let book = session.engine().book(&id)?;
    let market = book.market();

    let odds: Vec<_> = (0..market.outcome_count())
        .map(|outcome| book.current_odds(outcome).ok().flatten())
        .collect();
    if output::is_json() {
        return output::json_result(
            "market.show",
            &json!({
                "market": market,
                "current_odds": odds,
                "solvency": book.solvency_view(),
                "pending_fee": book.pending_fee(),
                "surplus": book.surplus(),
            }),
        );
    }

    output::header(env!("CARGO_PKG_VERSION"));
    describe(market);
    output::section("Odds");
    for (outcome, quote) in odds.iter().enumerate() {
        let label = format!("Outcome {outcome}");
        match quote {
            Some(quote) => output::field(&label, quote),
            None => output::field(&label, output::muted("not set")),
        }
    }
    output::section("Reserve");
    output::field("Reserve", book.solvency().reserve_balance);
    output::field("Liability", book.solvency().outstanding_liability);
    output::field("Pending fee", book.pending_fee());
    output::field("Surplus", book.surplus());
    Ok(())
}

/// Execute `market list`.
pub fn list(session: &Session) -> Result<()> {
    let markets = session.engine().markets();
    if output::is_json() {
        return output::json_result("market.list", &markets);
    }
    output::table(
        markets.iter().map(MarketRow::from).collect(),
        "No markets yet.",
    );
    Ok(())
}

fn describe(market: &Market) {
    output::field("Market", market.id());
    if !market.question().is_empty() {
        output::field("Question", market.question());
    }
    output::field("State", market.state());
    output::field("Model", market.model());
    output::field("Asset", market.asset());
    output::field("Outcomes", market.outcome_count());
    output::field("Fee (bps)", market.fee_bps());
    output::field("Min stake", market.min_stake());
    if let Some(cutoff) = market.betting_cutoff() {
        output::field("Cutoff", cutoff.to_rfc3339());
    }
    output::field("Pool", market.total_pool());
    if let Some(winner) = market.winning_outcome() {
        output::field("Winner", output::positive(winner));
    }
}
