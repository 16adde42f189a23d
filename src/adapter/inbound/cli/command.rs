//! Command-line interface definitions.
//!
//! Defines the CLI structure for the oddsledger application using `clap`.
//! Every ledger command loads the configured database, applies one
//! operation as `--caller` and persists the result before exiting.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use crate::domain::{Line, Odds, PayoutModel};

/// Fixed-odds wagering ledger
#[derive(Parser, Debug)]
#[command(name = "oddsledger")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "oddsledger.toml")]
    pub config: PathBuf,

    /// Account the command acts as
    #[arg(long, global = true, default_value = "operator")]
    pub caller: String,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the oddsledger CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create markets and drive their lifecycle
    #[command(subcommand)]
    Market(MarketCommand),

    /// Set and inspect odds
    #[command(subcommand)]
    Odds(OddsCommand),

    /// Place and list wagers
    #[command(subcommand)]
    Bet(BetCommand),

    /// Resolve markets and pay out
    #[command(subcommand)]
    Settle(SettleCommand),

    /// Manage market reserves
    #[command(subcommand)]
    Reserve(ReserveCommand),

    /// Show ledger status
    Status,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Payout model accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModelArg {
    /// Fixed odds locked in at placement
    Fixed,
    /// Share of the pool after fees
    Parimutuel,
}

impl From<ModelArg> for PayoutModel {
    fn from(model: ModelArg) -> Self {
        match model {
            ModelArg::Fixed => Self::FixedOdds,
            ModelArg::Parimutuel => Self::Parimutuel,
        }
    }
}

/// Subcommands for `oddsledger market`.
#[derive(Subcommand, Debug)]
pub enum MarketCommand {
    /// Create a market in the inactive state.
    Create(MarketCreateArgs),
    /// Open a market for wagering.
    Open(MarketArg),
    /// Stop accepting wagers temporarily.
    Suspend(MarketArg),
    /// Resume wagering on a suspended market.
    Resume(MarketArg),
    /// Stop wagering ahead of resolution.
    Close(MarketArg),
    /// Cancel a market so every stake can be refunded.
    Cancel(MarketArg),
    /// Display one market.
    Show(MarketArg),
    /// List every market.
    List,
}

/// Arguments for `market create`.
#[derive(Args, Debug)]
pub struct MarketCreateArgs {
    /// Market identifier (generated when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Human-readable question
    #[arg(long, default_value = "")]
    pub question: String,

    /// Asset stakes and payouts are denominated in
    #[arg(long)]
    pub asset: String,

    /// Payout model
    #[arg(long, value_enum, default_value = "fixed")]
    pub model: ModelArg,

    /// Initial odds per outcome, e.g. `--odds 2.0 --odds 3.5`
    #[arg(long)]
    pub odds: Vec<Odds>,

    /// Outcome count for parimutuel markets
    #[arg(long)]
    pub outcomes: Option<u8>,

    /// Fee in basis points (defaults to `[ledger].fee_bps`)
    #[arg(long)]
    pub fee_bps: Option<u16>,

    /// Smallest accepted stake (defaults to `[ledger].min_stake`)
    #[arg(long)]
    pub min_stake: Option<Decimal>,

    /// RFC 3339 instant after which wagering closes
    #[arg(long)]
    pub cutoff: Option<DateTime<Utc>>,
}

/// Shared argument for commands that address one market.
#[derive(Args, Debug)]
pub struct MarketArg {
    /// Market identifier
    pub market: String,
}

/// Subcommands for `oddsledger odds`.
#[derive(Subcommand, Debug)]
pub enum OddsCommand {
    /// Make a quote the active odds for an outcome.
    Set(OddsSetArgs),
    /// Show every quote an outcome has had.
    History(OutcomeArgs),
}

/// Arguments for `odds set`.
#[derive(Args, Debug)]
pub struct OddsSetArgs {
    /// Market identifier
    pub market: String,
    /// Outcome index
    pub outcome: u8,
    /// Decimal odds multiplier, e.g. `2.25`
    pub odds: Odds,
    /// Handicap line, e.g. `-1.5`
    #[arg(long, allow_hyphen_values = true)]
    pub line: Option<Line>,
}

/// Market plus outcome.
#[derive(Args, Debug)]
pub struct OutcomeArgs {
    /// Market identifier
    pub market: String,
    /// Outcome index
    pub outcome: u8,
}

/// Subcommands for `oddsledger bet`.
#[derive(Subcommand, Debug)]
pub enum BetCommand {
    /// Place a wager as the caller.
    Place(BetPlaceArgs),
    /// List wagers on a market.
    List(BetListArgs),
}

/// Arguments for `bet place`.
#[derive(Args, Debug)]
pub struct BetPlaceArgs {
    /// Market identifier
    pub market: String,
    /// Outcome index
    pub outcome: u8,
    /// Stake amount
    pub stake: Decimal,
}

/// Arguments for `bet list`.
#[derive(Args, Debug)]
pub struct BetListArgs {
    /// Market identifier
    pub market: String,
    /// Only this owner's bets (all owners when omitted)
    #[arg(long)]
    pub owner: Option<String>,
}

/// Subcommands for `oddsledger settle`.
#[derive(Subcommand, Debug)]
pub enum SettleCommand {
    /// Declare the winning outcome.
    Resolve(OutcomeArgs),
    /// Claim one winning bet as the caller.
    Claim(BetArg),
    /// Claim every winning bet the caller holds.
    ClaimAll(MarketArg),
    /// Refund one bet on a cancelled market.
    Refund(BetArg),
    /// Return the reserve when nobody picked the winner.
    Sweep(MarketArg),
}

/// Market plus bet index.
#[derive(Args, Debug)]
pub struct BetArg {
    /// Market identifier
    pub market: String,
    /// Index of the bet in the caller's list
    pub bet_index: usize,
}

/// Subcommands for `oddsledger reserve`.
#[derive(Subcommand, Debug)]
pub enum ReserveCommand {
    /// Add funds to a market's reserve.
    Fund(ReserveMoveArgs),
    /// Withdraw uncommitted reserve.
    Withdraw(ReserveMoveArgs),
    /// Show a market's reserve and liability.
    Show(MarketArg),
    /// Show reserve and liability summed over an asset.
    Asset(AssetArg),
}

/// Arguments for `reserve fund` and `reserve withdraw`.
#[derive(Args, Debug)]
pub struct ReserveMoveArgs {
    /// Market identifier
    pub market: String,
    /// Amount to move
    pub amount: Decimal,
    /// Counterparty account (defaults to the caller)
    #[arg(long)]
    pub account: Option<String>,
}

/// Asset identifier argument.
#[derive(Args, Debug)]
pub struct AssetArg {
    /// Asset identifier
    pub asset: String,
}

/// Subcommands for `oddsledger config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show,
    /// Validate a configuration file for correctness.
    Validate,
}
