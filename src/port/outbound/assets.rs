//! Settlement asset port for moving funds in and out of the ledger.

use thiserror::Error;

use crate::domain::{AccountId, Amount, AssetId, Transfer};

/// Failure reported by a settlement asset adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient {asset} balance for {account}: need {needed}, have {available}")]
    InsufficientFunds {
        account: AccountId,
        asset: AssetId,
        needed: Amount,
        available: Amount,
    },

    #[error("unsupported asset {0}")]
    UnsupportedAsset(AssetId),

    #[error("transfer rejected: {0}")]
    Rejected(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Moves a market's settlement asset between accounts and the ledger.
///
/// A batch is all-or-nothing: either every transfer in it happened or none
/// did. The engine relies on this to undo its bookkeeping on failure.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`). The engine may call
/// back into itself from inside `settle`; such calls are refused for the
/// market being settled.
pub trait SettlementAssets: Send + Sync {
    /// Execute `transfers` in `asset` atomically.
    ///
    /// # Errors
    /// Returns a [`TransferError`] if any transfer cannot be made, in which
    /// case none of them were applied.
    fn settle(&self, asset: &AssetId, transfers: &[Transfer]) -> Result<(), TransferError>;
}
