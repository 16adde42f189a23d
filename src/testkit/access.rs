//! Blanket access policies.

use crate::domain::{AccountId, Action};
use crate::port::AccessPolicy;

/// Grants every action to every caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn can(&self, _caller: &AccountId, _action: Action) -> bool {
        true
    }
}

/// Refuses every action.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl AccessPolicy for DenyAll {
    fn can(&self, _caller: &AccountId, _action: Action) -> bool {
        false
    }
}
