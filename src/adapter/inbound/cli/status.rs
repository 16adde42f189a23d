//! Handler for the `status` command.

use std::collections::BTreeSet;

use serde_json::json;
use tabled::Tabled;

use super::output;
use super::run::Session;
use crate::domain::{AssetId, MarketState};
use crate::error::Result;

#[derive(Tabled)]
struct AssetRow {
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Reserve")]
    reserve: String,
    #[tabled(rename = "Liability")]
    liability: String,
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Custody")]
    custody: String,
}

/// Execute the status command.
pub fn execute(session: &Session) -> Result<()> {
    let engine = session.engine();
    let markets = engine.markets();
    let assets: BTreeSet<AssetId> = markets.iter().map(|m| m.asset().clone()).collect();
    let open = markets
        .iter()
        .filter(|m| m.state() == MarketState::Open)
        .count();

    let mut rows = Vec::with_capacity(assets.len());
    let mut summaries = Vec::with_capacity(assets.len());
    for asset in &assets {
        let view = engine.asset_solvency(asset);
        let custody = session.runtime.journal.custody_balance(asset)?;
        rows.push(AssetRow {
            asset: asset.to_string(),
            reserve: view.reserve_balance.to_string(),
            liability: view.outstanding_liability.to_string(),
            pool: view.total_pool.to_string(),
            custody: custody.to_string(),
        });
        summaries.push(json!({ "solvency": view, "custody": custody }));
    }

    if output::is_json() {
        return output::json_result(
            "status",
            &json!({
                "database": session.config.database,
                "paused": engine.is_paused(),
                "markets": markets.len(),
                "open_markets": open,
                "assets": summaries,
            }),
        );
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Database", &session.config.database);
    output::field(
        "Paused",
        if engine.is_paused() {
            output::negative("yes")
        } else {
            output::positive("no")
        },
    );
    output::field("Markets", markets.len());
    output::field("Open", open);
    output::section("Assets");
    output::table(rows, "No markets yet.");
    Ok(())
}
