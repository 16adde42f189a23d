//! Handler for the `config` command group.

use std::path::Path;

use serde_json::json;

use super::output;
use super::run::load_config;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = load_config(path)?;

    if output::is_json() {
        return output::json_result("config.show", &summary(&config));
    }

    output::section("Effective Configuration");
    output::field("Database", &config.database);
    output::field("Log level", &config.logging.level);
    output::field("Log format", &config.logging.format);

    output::section("Ledger");
    output::field("Fee (bps)", config.ledger.fee_bps);
    output::field("Fee recipient", &config.ledger.fee_recipient);
    output::field("Min stake", config.ledger.min_stake);
    output::field("Paused", config.ledger.paused);

    output::section("Roles");
    output::field("Administrators", config.roles.administrators.join(", "));
    output::field("Market makers", config.roles.market_makers.join(", "));
    output::field("Odds setters", config.roles.odds_setters.join(", "));
    output::field("Resolvers", config.roles.resolvers.join(", "));
    Ok(())
}

/// Execute `config validate`. Unlike other commands a missing file is an
/// error here.
pub fn execute_validate(path: &Path) -> Result<()> {
    Config::load(path)?;
    if output::is_json() {
        return output::json_result(
            "config.validate",
            &json!({ "path": path.display().to_string(), "valid": true }),
        );
    }
    output::success(&format!("{} is valid", path.display()));
    Ok(())
}

fn summary(config: &Config) -> serde_json::Value {
    json!({
        "database": config.database,
        "logging": { "level": config.logging.level, "format": config.logging.format },
        "ledger": {
            "fee_bps": config.ledger.fee_bps,
            "fee_recipient": config.ledger.fee_recipient,
            "min_stake": config.ledger.min_stake,
            "paused": config.ledger.paused,
        },
        "roles": {
            "administrators": config.roles.administrators,
            "market_makers": config.roles.market_makers,
            "odds_setters": config.roles.odds_setters,
            "resolvers": config.roles.resolvers,
        },
    })
}
