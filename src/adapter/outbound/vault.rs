//! In-memory settlement asset adapter.
//!
//! Tracks a balance per account per asset. Funds received by the ledger are
//! held in a custody account; releases are paid out of it.

use std::collections::HashMap;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{AccountId, Amount, AssetId, Transfer};
use crate::port::outbound::assets::{SettlementAssets, TransferError};

/// Account that holds funds on behalf of the ledger.
pub const CUSTODY_ACCOUNT: &str = "ledger-custody";

type BalanceKey = (AssetId, AccountId);

/// Balances kept in process memory.
#[derive(Debug)]
pub struct Vault {
    custody: AccountId,
    balances: Mutex<HashMap<BalanceKey, Amount>>,
}

impl Default for Vault {
    fn default() -> Self {
        Self::new()
    }
}

impl Vault {
    #[must_use]
    pub fn new() -> Self {
        Self {
            custody: AccountId::new(CUSTODY_ACCOUNT),
            balances: Mutex::new(HashMap::new()),
        }
    }

    /// Credit an account from outside the ledger.
    pub fn deposit(&self, account: &AccountId, asset: &AssetId, amount: Amount) {
        *self
            .balances
            .lock()
            .entry((asset.clone(), account.clone()))
            .or_insert(Decimal::ZERO) += amount;
    }

    #[must_use]
    pub fn balance(&self, account: &AccountId, asset: &AssetId) -> Amount {
        self.balances
            .lock()
            .get(&(asset.clone(), account.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Funds currently held for the ledger in `asset`.
    #[must_use]
    pub fn custody_balance(&self, asset: &AssetId) -> Amount {
        self.balance(&self.custody, asset)
    }

    #[must_use]
    pub fn custody(&self) -> &AccountId {
        &self.custody
    }
}

impl SettlementAssets for Vault {
    fn settle(&self, asset: &AssetId, transfers: &[Transfer]) -> Result<(), TransferError> {
        let mut balances = self.balances.lock();
        let mut staged: HashMap<AccountId, Amount> = HashMap::new();

        let current = |staged: &HashMap<AccountId, Amount>,
                       balances: &HashMap<BalanceKey, Amount>,
                       account: &AccountId| {
            staged.get(account).copied().unwrap_or_else(|| {
                balances
                    .get(&(asset.clone(), account.clone()))
                    .copied()
                    .unwrap_or(Decimal::ZERO)
            })
        };

        for transfer in transfers {
            let amount = transfer.amount();
            if amount < Decimal::ZERO {
                return Err(TransferError::Rejected(format!("negative amount {amount}")));
            }
            let (payer, payee) = match transfer {
                Transfer::Receive { from, .. } => (from, &self.custody),
                Transfer::Release { to, .. } => (&self.custody, to),
            };
            let available = current(&staged, &*balances, payer);
            if available < amount {
                return Err(TransferError::InsufficientFunds {
                    account: payer.clone(),
                    asset: asset.clone(),
                    needed: amount,
                    available,
                });
            }
            staged.insert(payer.clone(), available - amount);
            let credited = current(&staged, &*balances, payee)
                .checked_add(amount)
                .ok_or_else(|| TransferError::Rejected(format!("balance overflow for {payee}")))?;
            staged.insert(payee.clone(), credited);
        }

        for (account, balance) in staged {
            balances.insert((asset.clone(), account), balance);
        }
        debug!(asset = %asset, transfers = transfers.len(), "Vault settled batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usdc() -> AssetId {
        AssetId::new("USDC")
    }

    #[test]
    fn receive_moves_funds_into_custody() {
        let vault = Vault::new();
        let alice = AccountId::new("alice");
        vault.deposit(&alice, &usdc(), dec!(100));

        vault
            .settle(
                &usdc(),
                &[Transfer::Receive {
                    from: alice.clone(),
                    amount: dec!(40),
                }],
            )
            .unwrap();

        assert_eq!(vault.balance(&alice, &usdc()), dec!(60));
        assert_eq!(vault.custody_balance(&usdc()), dec!(40));
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let vault = Vault::new();
        let alice = AccountId::new("alice");
        let bob = AccountId::new("bob");
        vault.deposit(&vault.custody().clone(), &usdc(), dec!(50));

        let err = vault
            .settle(
                &usdc(),
                &[
                    Transfer::Release {
                        to: alice.clone(),
                        amount: dec!(30),
                    },
                    Transfer::Release {
                        to: bob.clone(),
                        amount: dec!(30),
                    },
                ],
            )
            .unwrap_err();

        assert!(matches!(err, TransferError::InsufficientFunds { .. }));
        assert_eq!(vault.balance(&alice, &usdc()), dec!(0));
        assert_eq!(vault.custody_balance(&usdc()), dec!(50));
    }

    #[test]
    fn assets_are_separate() {
        let vault = Vault::new();
        let alice = AccountId::new("alice");
        vault.deposit(&alice, &usdc(), dec!(10));
        assert_eq!(vault.balance(&alice, &AssetId::new("DAI")), dec!(0));
        assert!(vault
            .settle(
                &AssetId::new("DAI"),
                &[Transfer::Receive {
                    from: alice,
                    amount: dec!(1),
                }],
            )
            .is_err());
    }
}
