//! SQLite transfer journal.
//!
//! Records every settled transfer batch as journal rows. The ledger's
//! custody balance for an asset is the sum of inbound rows minus outbound
//! rows, so the journal doubles as an audit trail for the CLI.

use std::str::FromStr;

use chrono::Utc;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::adapter::outbound::sqlite::database::connection::{self, DbPool};
use crate::adapter::outbound::sqlite::database::model::{NewTransferRow, TransferRow};
use crate::adapter::outbound::sqlite::database::schema::transfers;
use crate::domain::{AccountId, Amount, AssetId, Transfer};
use crate::error::{Error, Result};
use crate::port::outbound::assets::{SettlementAssets, TransferError};

/// One journaled transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    pub id: i32,
    pub asset: AssetId,
    pub account: AccountId,
    /// `in` for funds received by the ledger, `out` for releases.
    pub direction: String,
    pub amount: Amount,
    pub recorded_at: String,
}

/// Settlement adapter that journals transfers to SQLite.
pub struct TransferJournal {
    pool: DbPool,
}

impl TransferJournal {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// All entries for `asset`, oldest first.
    ///
    /// # Errors
    /// Returns an error if the journal cannot be read.
    pub fn entries(&self, asset: &AssetId) -> Result<Vec<JournalEntry>> {
        let mut conn = connection::connect(&self.pool)?;
        let rows: Vec<TransferRow> = transfers::table
            .filter(transfers::asset.eq(asset.as_str()))
            .select(TransferRow::as_select())
            .order(transfers::id.asc())
            .load(&mut conn)?;
        rows.into_iter().map(Self::from_row).collect()
    }

    /// Funds the ledger holds in `asset`: everything received less
    /// everything released.
    ///
    /// # Errors
    /// Returns an error if the journal cannot be read.
    pub fn custody_balance(&self, asset: &AssetId) -> Result<Amount> {
        Ok(self
            .entries(asset)?
            .iter()
            .map(|entry| match entry.direction.as_str() {
                "in" => entry.amount,
                _ => -entry.amount,
            })
            .sum())
    }

    /// Net amount `account` has received from the ledger in `asset`.
    /// Negative when the account has paid in more than it took out.
    ///
    /// # Errors
    /// Returns an error if the journal cannot be read.
    pub fn net_flow(&self, account: &AccountId, asset: &AssetId) -> Result<Amount> {
        Ok(self
            .entries(asset)?
            .iter()
            .filter(|entry| &entry.account == account)
            .map(|entry| match entry.direction.as_str() {
                "out" => entry.amount,
                _ => -entry.amount,
            })
            .sum())
    }

    fn from_row(row: TransferRow) -> Result<JournalEntry> {
        let amount = Decimal::from_str(&row.amount).map_err(|e| Error::Parse(e.to_string()))?;
        Ok(JournalEntry {
            id: row.id.unwrap_or_default(),
            asset: AssetId::from(row.asset),
            account: AccountId::from(row.account),
            direction: row.direction,
            amount,
            recorded_at: row.recorded_at,
        })
    }
}

impl SettlementAssets for TransferJournal {
    fn settle(
        &self,
        asset: &AssetId,
        batch: &[Transfer],
    ) -> std::result::Result<(), TransferError> {
        if batch.is_empty() {
            return Ok(());
        }
        if let Some(negative) = batch.iter().find(|t| t.amount() < Decimal::ZERO) {
            return Err(TransferError::Rejected(format!("negative transfer {negative}")));
        }

        let recorded_at = Utc::now().to_rfc3339();
        let rows: Vec<NewTransferRow> = batch
            .iter()
            .map(|transfer| NewTransferRow {
                asset: asset.to_string(),
                account: transfer.account().to_string(),
                direction: transfer.direction().to_string(),
                amount: transfer.amount().to_string(),
                recorded_at: recorded_at.clone(),
            })
            .collect();

        let mut conn = connection::connect(&self.pool)
            .map_err(|e| TransferError::Backend(e.to_string()))?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            for row in &rows {
                diesel::insert_into(transfers::table)
                    .values(row)
                    .execute(conn)?;
            }
            Ok(())
        })
        .map_err(|e| TransferError::Backend(e.to_string()))?;

        debug!(asset = %asset, transfers = rows.len(), "Journaled transfer batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn journal() -> (tempfile::TempDir, TransferJournal) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let pool = connection::open(path.to_str().unwrap()).unwrap();
        (dir, TransferJournal::new(pool))
    }

    #[test]
    fn batch_is_journaled_in_order() {
        let (_dir, journal) = journal();
        let usdc = AssetId::new("USDC");
        let alice = AccountId::new("alice");

        journal
            .settle(
                &usdc,
                &[
                    Transfer::Receive {
                        from: alice.clone(),
                        amount: dec!(100),
                    },
                    Transfer::Release {
                        to: alice.clone(),
                        amount: dec!(30),
                    },
                ],
            )
            .unwrap();

        let entries = journal.entries(&usdc).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].direction, "in");
        assert_eq!(entries[1].direction, "out");
        assert_eq!(journal.custody_balance(&usdc).unwrap(), dec!(70));
        assert_eq!(journal.net_flow(&alice, &usdc).unwrap(), dec!(-70));
    }

    #[test]
    fn assets_are_journaled_separately() {
        let (_dir, journal) = journal();
        journal
            .settle(
                &AssetId::new("USDC"),
                &[Transfer::Receive {
                    from: AccountId::new("alice"),
                    amount: dec!(5),
                }],
            )
            .unwrap();
        assert!(journal.entries(&AssetId::new("DAI")).unwrap().is_empty());
    }

    #[test]
    fn negative_amount_rejects_whole_batch() {
        let (_dir, journal) = journal();
        let usdc = AssetId::new("USDC");
        let err = journal
            .settle(
                &usdc,
                &[
                    Transfer::Receive {
                        from: AccountId::new("alice"),
                        amount: dec!(5),
                    },
                    Transfer::Release {
                        to: AccountId::new("bob"),
                        amount: dec!(-1),
                    },
                ],
            )
            .unwrap_err();
        assert!(matches!(err, TransferError::Rejected(_)));
        assert!(journal.entries(&usdc).unwrap().is_empty());
    }
}
