//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{bets, markets, odds_quotes, odds_registries, transfers};

/// Database row for a market.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = markets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketRow {
    pub id: String,
    pub question: String,
    pub outcome_count: i32,
    pub state: String,
    pub winning_outcome: Option<i32>,
    pub total_pool: String,
    /// JSON array of per-outcome pools.
    pub outcome_pools: String,
    pub created_at: String,
    pub resolved_at: Option<String>,
    pub asset: String,
    pub model: String,
    pub fee_bps: i32,
    pub fee: String,
    pub fee_charged: i32,
    pub betting_cutoff: Option<String>,
    pub min_stake: String,
    pub reserve_balance: String,
    pub outstanding_liability: String,
}

/// Database row for one outcome's registry pointer.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = odds_registries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RegistryRow {
    pub market_id: String,
    pub outcome: i32,
    pub active_index: Option<i32>,
}

/// Database row for one registry entry.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = odds_quotes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuoteRow {
    pub market_id: String,
    pub outcome: i32,
    /// 1-based, matching the odds index.
    pub position: i32,
    pub odds: i32,
    pub line: Option<i32>,
}

/// Database row for a bet.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = bets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BetRow {
    pub market_id: String,
    pub owner: String,
    pub seq: i32,
    pub outcome: i32,
    pub stake: String,
    pub odds_index: Option<i32>,
    pub placed_at: String,
    pub claimed: i32,
    pub asset: String,
}

/// Database row for a journaled transfer (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = transfers)]
pub struct NewTransferRow {
    pub asset: String,
    pub account: String,
    pub direction: String,
    pub amount: String,
    pub recorded_at: String,
}

/// Database row for a journaled transfer (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = transfers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransferRow {
    pub id: Option<i32>,
    pub asset: String,
    pub account: String,
    pub direction: String,
    pub amount: String,
    pub recorded_at: String,
}
