//! CLI entry point: loads configuration, opens the ledger and dispatches.

use std::path::Path;

use tracing::debug;

use super::command::{
    BetCommand, Cli, Commands, ConfigCommand, MarketCommand, OddsCommand, ReserveCommand,
    SettleCommand,
};
use super::{bet, config, market, odds, output, reserve, settle, status};
use crate::application::LedgerEngine;
use crate::domain::{AccountId, MarketId};
use crate::error::Result;
use crate::infrastructure::bootstrap::{build_runtime, Runtime};
use crate::infrastructure::config::settings::Config;

/// Everything a ledger command needs.
pub struct Session {
    pub config: Config,
    pub caller: AccountId,
    pub runtime: Runtime,
}

impl Session {
    /// Load configuration and open the ledger it points at.
    ///
    /// A missing configuration file falls back to defaults.
    ///
    /// # Errors
    /// Returns configuration or database errors.
    pub fn open(config_path: &Path, caller: &str) -> Result<Self> {
        let config = load_config(config_path)?;
        config.init_logging();
        let runtime = build_runtime(&config)?;
        debug!(caller, database = %config.database, "Session opened");
        Ok(Self {
            config,
            caller: AccountId::new(caller),
            runtime,
        })
    }

    #[must_use]
    pub fn engine(&self) -> &LedgerEngine {
        &self.runtime.engine
    }
}

/// Parse configuration, using defaults when the file does not exist.
///
/// # Errors
/// Returns an error if an existing file cannot be read or is invalid.
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        Config::parse_toml("")
    }
}

pub(crate) fn market_id(raw: &str) -> MarketId {
    MarketId::new(raw)
}

/// Execute a parsed command line.
///
/// # Errors
/// Returns the first error raised by the command.
pub fn execute(cli: Cli) -> Result<()> {
    output::configure(output::OutputConfig::new(cli.json, cli.quiet), &cli.color);

    if let Commands::Config(command) = &cli.command {
        return match command {
            ConfigCommand::Show => config::execute_show(&cli.config),
            ConfigCommand::Validate => config::execute_validate(&cli.config),
        };
    }

    let session = Session::open(&cli.config, &cli.caller)?;
    match cli.command {
        Commands::Market(command) => match command {
            MarketCommand::Create(args) => market::create(&session, args),
            MarketCommand::Open(arg) => market::open(&session, &arg.market),
            MarketCommand::Suspend(arg) => market::suspend(&session, &arg.market),
            MarketCommand::Resume(arg) => market::resume(&session, &arg.market),
            MarketCommand::Close(arg) => market::close(&session, &arg.market),
            MarketCommand::Cancel(arg) => market::cancel(&session, &arg.market),
            MarketCommand::Show(arg) => market::show(&session, &arg.market),
            MarketCommand::List => market::list(&session),
        },
        Commands::Odds(command) => match command {
            OddsCommand::Set(args) => odds::set(&session, args),
            OddsCommand::History(args) => odds::history(&session, &args),
        },
        Commands::Bet(command) => match command {
            BetCommand::Place(args) => bet::place(&session, &args),
            BetCommand::List(args) => bet::list(&session, &args),
        },
        Commands::Settle(command) => match command {
            SettleCommand::Resolve(args) => settle::resolve(&session, &args),
            SettleCommand::Claim(arg) => settle::claim(&session, &arg),
            SettleCommand::ClaimAll(arg) => settle::claim_all(&session, &arg.market),
            SettleCommand::Refund(arg) => settle::refund(&session, &arg),
            SettleCommand::Sweep(arg) => settle::sweep(&session, &arg.market),
        },
        Commands::Reserve(command) => match command {
            ReserveCommand::Fund(args) => reserve::fund(&session, &args),
            ReserveCommand::Withdraw(args) => reserve::withdraw(&session, &args),
            ReserveCommand::Show(arg) => reserve::show(&session, &arg.market),
            ReserveCommand::Asset(arg) => reserve::asset(&session, &arg.asset),
        },
        Commands::Status => status::execute(&session),
        Commands::Config(_) => Ok(()),
    }
}
