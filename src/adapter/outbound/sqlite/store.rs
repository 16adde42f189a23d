//! SQLite ledger store implementation.
//!
//! Persists every market book as a market row plus its registries, quotes
//! and bets. Saving rewrites a market's rows inside one transaction.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use tracing::debug;

use crate::adapter::outbound::sqlite::database::connection::{self, DbPool};
use crate::adapter::outbound::sqlite::database::model::{BetRow, MarketRow, QuoteRow, RegistryRow};
use crate::adapter::outbound::sqlite::database::schema::{
    bets, markets, odds_quotes, odds_registries,
};
use crate::domain::{
    AccountId, Amount, AssetId, Bet, Line, Market, MarketBook, MarketId, MarketState, Odds,
    OddsIndex, OddsRegistry, PayoutModel, Quote, Solvency,
};
use crate::error::{Error, Result};
use crate::port::outbound::store::LedgerStore;

/// SQLite-backed ledger store.
pub struct SqliteLedgerStore {
    pool: DbPool,
}

impl SqliteLedgerStore {
    /// Create a store over an already migrated pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database at `path` and migrate it.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &str) -> Result<Self> {
        Ok(Self::new(connection::open(path)?))
    }

    /// The underlying pool, shared with the transfer journal.
    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn market_row(book: &MarketBook) -> Result<MarketRow> {
        let market = book.market();
        let solvency = book.solvency();
        Ok(MarketRow {
            id: market.id().to_string(),
            question: market.question().to_string(),
            outcome_count: i32::from(market.outcome_count()),
            state: market.state().as_str().to_string(),
            winning_outcome: market.winning_outcome().map(i32::from),
            total_pool: market.total_pool().to_string(),
            outcome_pools: serde_json::to_string(market.outcome_pools())?,
            created_at: market.created_at().to_rfc3339(),
            resolved_at: market.resolved_at().map(|t| t.to_rfc3339()),
            asset: market.asset().to_string(),
            model: market.model().as_str().to_string(),
            fee_bps: i32::from(market.fee_bps()),
            fee: market.fee().to_string(),
            fee_charged: i32::from(market.fee_charged()),
            betting_cutoff: market.betting_cutoff().map(|t| t.to_rfc3339()),
            min_stake: market.min_stake().to_string(),
            reserve_balance: solvency.reserve_balance.to_string(),
            outstanding_liability: solvency.outstanding_liability.to_string(),
        })
    }

    fn registry_rows(book: &MarketBook) -> Result<(Vec<RegistryRow>, Vec<QuoteRow>)> {
        let market_id = book.id().to_string();
        let mut registries = Vec::with_capacity(book.registries().len());
        let mut quotes = Vec::new();
        for (outcome, registry) in book.registries().iter().enumerate() {
            let outcome = to_i32(outcome, "outcome")?;
            registries.push(RegistryRow {
                market_id: market_id.clone(),
                outcome,
                active_index: registry
                    .active_index()
                    .map(|index| to_i32(index.value(), "odds_index"))
                    .transpose()?,
            });
            for (slot, quote) in registry.history().iter().enumerate() {
                quotes.push(QuoteRow {
                    market_id: market_id.clone(),
                    outcome,
                    position: to_i32(slot + 1, "position")?,
                    odds: to_i32(quote.odds.raw(), "odds")?,
                    line: quote.line.map(Line::hundredths),
                });
            }
        }
        Ok((registries, quotes))
    }

    fn bet_rows(book: &MarketBook) -> Result<Vec<BetRow>> {
        let market_id = book.id().to_string();
        book.bet_ledger()
            .iter()
            .map(|(seq, bet)| {
                Ok(BetRow {
                    market_id: market_id.clone(),
                    owner: bet.owner.to_string(),
                    seq: to_i32(seq, "bet_index")?,
                    outcome: i32::from(bet.outcome),
                    stake: bet.stake.to_string(),
                    odds_index: bet
                        .odds_index
                        .map(|index| to_i32(index.value(), "odds_index"))
                        .transpose()?,
                    placed_at: bet.placed_at.to_rfc3339(),
                    claimed: i32::from(bet.claimed),
                    asset: bet.asset.to_string(),
                })
            })
            .collect()
    }

    fn market_from_row(row: &MarketRow) -> Result<(Market, Solvency)> {
        let outcome_pools: Vec<Amount> = serde_json::from_str(&row.outcome_pools)?;
        let model = PayoutModel::from_str(&row.model)?;
        let state = MarketState::from_str(&row.state)?;
        let market = Market {
            id: MarketId::from(row.id.clone()),
            question: row.question.clone(),
            outcome_count: to_u8(row.outcome_count, "outcome_count")?,
            state,
            winning_outcome: row
                .winning_outcome
                .map(|o| to_u8(o, "winning_outcome"))
                .transpose()?,
            total_pool: parse_amount(&row.total_pool)?,
            outcome_pools,
            created_at: parse_time(&row.created_at)?,
            resolved_at: row.resolved_at.as_deref().map(parse_time).transpose()?,
            asset: AssetId::from(row.asset.clone()),
            model,
            fee_bps: u16::try_from(row.fee_bps).map_err(|e| Error::Parse(e.to_string()))?,
            fee: parse_amount(&row.fee)?,
            fee_charged: row.fee_charged != 0,
            betting_cutoff: row.betting_cutoff.as_deref().map(parse_time).transpose()?,
            min_stake: parse_amount(&row.min_stake)?,
        };
        let solvency = Solvency::new(
            parse_amount(&row.reserve_balance)?,
            parse_amount(&row.outstanding_liability)?,
        );
        Ok((market, solvency))
    }

    fn registries_from_rows(
        outcome_count: u8,
        registries: &[RegistryRow],
        quotes: &[QuoteRow],
    ) -> Result<Vec<OddsRegistry>> {
        let mut history: Vec<Vec<Quote>> = vec![Vec::new(); usize::from(outcome_count)];
        let mut active: Vec<Option<OddsIndex>> = vec![None; usize::from(outcome_count)];

        for row in quotes {
            let slot = outcome_slot(row.outcome, outcome_count)?;
            let odds = Odds::try_new(
                u32::try_from(row.odds).map_err(|e| Error::Parse(e.to_string()))?,
            )?;
            history[slot].push(Quote {
                odds,
                line: row.line.map(Line::new),
            });
        }
        for row in registries {
            let slot = outcome_slot(row.outcome, outcome_count)?;
            active[slot] = row.active_index.map(to_index).transpose()?;
        }

        history
            .into_iter()
            .zip(active)
            .map(|(quotes, active)| Ok(OddsRegistry::from_parts(quotes, active)?))
            .collect()
    }

    fn bet_from_row(row: &BetRow) -> Result<Bet> {
        Ok(Bet {
            owner: AccountId::from(row.owner.clone()),
            outcome: to_u8(row.outcome, "outcome")?,
            stake: parse_amount(&row.stake)?,
            odds_index: row.odds_index.map(to_index).transpose()?,
            placed_at: parse_time(&row.placed_at)?,
            claimed: row.claimed != 0,
            asset: AssetId::from(row.asset.clone()),
        })
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn save_market(&self, book: &MarketBook) -> Result<()> {
        let market_row = Self::market_row(book)?;
        let (registry_rows, quote_rows) = Self::registry_rows(book)?;
        let bet_rows = Self::bet_rows(book)?;
        let id = market_row.id.clone();

        let mut conn = connection::connect(&self.pool)?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(bets::table.filter(bets::market_id.eq(&id))).execute(conn)?;
            diesel::delete(odds_quotes::table.filter(odds_quotes::market_id.eq(&id)))
                .execute(conn)?;
            diesel::delete(odds_registries::table.filter(odds_registries::market_id.eq(&id)))
                .execute(conn)?;

            diesel::replace_into(markets::table)
                .values(&market_row)
                .execute(conn)?;
            for row in &registry_rows {
                diesel::insert_into(odds_registries::table)
                    .values(row)
                    .execute(conn)?;
            }
            for row in &quote_rows {
                diesel::insert_into(odds_quotes::table)
                    .values(row)
                    .execute(conn)?;
            }
            for row in &bet_rows {
                diesel::insert_into(bets::table).values(row).execute(conn)?;
            }
            Ok(())
        })?;

        debug!(
            market_id = %id,
            quotes = quote_rows.len(),
            bets = bet_rows.len(),
            "Saved market book"
        );
        Ok(())
    }

    fn load_markets(&self) -> Result<Vec<MarketBook>> {
        let mut conn = connection::connect(&self.pool)?;

        let market_rows: Vec<MarketRow> = markets::table
            .select(MarketRow::as_select())
            .order(markets::id.asc())
            .load(&mut conn)?;
        let registry_rows: Vec<RegistryRow> = odds_registries::table
            .select(RegistryRow::as_select())
            .load(&mut conn)?;
        let quote_rows: Vec<QuoteRow> = odds_quotes::table
            .select(QuoteRow::as_select())
            .order((
                odds_quotes::market_id.asc(),
                odds_quotes::outcome.asc(),
                odds_quotes::position.asc(),
            ))
            .load(&mut conn)?;
        let bet_rows: Vec<BetRow> = bets::table
            .select(BetRow::as_select())
            .order((bets::market_id.asc(), bets::owner.asc(), bets::seq.asc()))
            .load(&mut conn)?;

        let mut registries_by: HashMap<String, Vec<RegistryRow>> = HashMap::new();
        for row in registry_rows {
            registries_by.entry(row.market_id.clone()).or_default().push(row);
        }
        let mut quotes_by: HashMap<String, Vec<QuoteRow>> = HashMap::new();
        for row in quote_rows {
            quotes_by.entry(row.market_id.clone()).or_default().push(row);
        }
        let mut bets_by: HashMap<String, Vec<BetRow>> = HashMap::new();
        for row in bet_rows {
            bets_by.entry(row.market_id.clone()).or_default().push(row);
        }

        let mut books = Vec::with_capacity(market_rows.len());
        for row in &market_rows {
            let (market, solvency) = Self::market_from_row(row)?;
            let registries = Self::registries_from_rows(
                market.outcome_count(),
                registries_by.get(&row.id).map_or(&[][..], Vec::as_slice),
                quotes_by.get(&row.id).map_or(&[][..], Vec::as_slice),
            )?;
            let bets = bets_by
                .get(&row.id)
                .map_or(&[][..], Vec::as_slice)
                .iter()
                .map(Self::bet_from_row)
                .collect::<Result<Vec<_>>>()?;
            books.push(MarketBook::from_parts(market, registries, bets, solvency)?);
        }

        debug!(markets = books.len(), "Loaded market books");
        Ok(books)
    }
}

fn parse_amount(raw: &str) -> Result<Amount> {
    Decimal::from_str(raw).map_err(|e| Error::Parse(format!("amount '{raw}': {e}")))
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(|e| Error::Parse(format!("timestamp '{raw}': {e}")))?
        .with_timezone(&Utc))
}

fn to_i32<T>(value: T, field: &str) -> Result<i32>
where
    T: TryInto<i32> + Copy + std::fmt::Display,
{
    value
        .try_into()
        .map_err(|_| Error::Parse(format!("{field} {value} out of range")))
}

fn to_u8(value: i32, field: &str) -> Result<u8> {
    u8::try_from(value).map_err(|_| Error::Parse(format!("{field} {value} out of range")))
}

fn to_index(value: i32) -> Result<OddsIndex> {
    let position = u32::try_from(value).map_err(|e| Error::Parse(e.to_string()))?;
    Ok(OddsIndex::new(position)?)
}

fn outcome_slot(outcome: i32, outcome_count: u8) -> Result<usize> {
    let outcome = to_u8(outcome, "outcome")?;
    if outcome >= outcome_count {
        return Err(Error::Parse(format!(
            "outcome {outcome} outside {outcome_count} outcomes"
        )));
    }
    Ok(usize::from(outcome))
}
