//! Settlement adapters with scripted behavior.

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;

use crate::adapter::outbound::vault::Vault;
use crate::application::LedgerEngine;
use crate::domain::{AccountId, AssetId, MarketId, Payout, Transfer};
use crate::error::Result;
use crate::port::{SettlementAssets, TransferError};

/// A [`Vault`] that can be told to reject upcoming batches.
#[derive(Debug, Default)]
pub struct FlakyAssets {
    vault: Vault,
    failures: Mutex<VecDeque<String>>,
    always: Mutex<Option<String>>,
    batches: Mutex<Vec<Vec<Transfer>>>,
}

impl FlakyAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next batch with `reason`.
    pub fn fail_next(&self, reason: &str) {
        self.failures.lock().push_back(reason.to_string());
    }

    /// Reject every batch until [`recover`](Self::recover) is called.
    pub fn fail_always(&self, reason: &str) {
        *self.always.lock() = Some(reason.to_string());
    }

    pub fn recover(&self) {
        *self.always.lock() = None;
        self.failures.lock().clear();
    }

    /// Batches that were applied, in order.
    pub fn batches(&self) -> Vec<Vec<Transfer>> {
        self.batches.lock().clone()
    }
}

impl Deref for FlakyAssets {
    type Target = Vault;

    fn deref(&self) -> &Vault {
        &self.vault
    }
}

impl SettlementAssets for FlakyAssets {
    fn settle(
        &self,
        asset: &AssetId,
        transfers: &[Transfer],
    ) -> std::result::Result<(), TransferError> {
        if let Some(reason) = self.always.lock().clone() {
            return Err(TransferError::Rejected(reason));
        }
        if let Some(reason) = self.failures.lock().pop_front() {
            return Err(TransferError::Rejected(reason));
        }
        self.vault.settle(asset, transfers)?;
        self.batches.lock().push(transfers.to_vec());
        Ok(())
    }
}

/// Adapter that claims on the engine from inside `settle`.
///
/// Each settlement attempts a claim for `owner` on `market_id` and records
/// what the engine answered before settling through its [`Vault`].
pub struct ReentrantAssets {
    vault: Vault,
    engine: OnceLock<Weak<LedgerEngine>>,
    target: Mutex<Option<(AccountId, MarketId)>>,
    attempts: Mutex<Vec<Result<Payout>>>,
}

impl Default for ReentrantAssets {
    fn default() -> Self {
        Self::new()
    }
}

impl ReentrantAssets {
    pub fn new() -> Self {
        Self {
            vault: Vault::new(),
            engine: OnceLock::new(),
            target: Mutex::new(None),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Attach the engine to call back into.
    pub fn attach(&self, engine: &Arc<LedgerEngine>) {
        let _ = self.engine.set(Arc::downgrade(engine));
    }

    /// Start calling back with a claim for `owner` on `market_id`.
    pub fn arm(&self, owner: AccountId, market_id: MarketId) {
        *self.target.lock() = Some((owner, market_id));
    }

    /// Take the recorded results of nested claims.
    pub fn take_attempts(&self) -> Vec<Result<Payout>> {
        std::mem::take(&mut *self.attempts.lock())
    }
}

impl Deref for ReentrantAssets {
    type Target = Vault;

    fn deref(&self) -> &Vault {
        &self.vault
    }
}

impl SettlementAssets for ReentrantAssets {
    fn settle(
        &self,
        asset: &AssetId,
        transfers: &[Transfer],
    ) -> std::result::Result<(), TransferError> {
        let target = self.target.lock().take();
        if let (Some((owner, market_id)), Some(engine)) =
            (target, self.engine.get().and_then(Weak::upgrade))
        {
            let attempt = engine.claim(&owner, &market_id, 0);
            self.attempts.lock().push(attempt);
        }
        self.vault.settle(asset, transfers)
    }
}
