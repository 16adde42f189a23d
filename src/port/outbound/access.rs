//! Access policy port.

use crate::domain::{AccountId, Action};

/// Capability check consulted before every privileged action.
///
/// The ledger keeps no role storage of its own; who may do what is entirely
/// the policy's concern.
pub trait AccessPolicy: Send + Sync {
    /// Whether `caller` may perform `action`.
    fn can(&self, caller: &AccountId, action: Action) -> bool;
}
