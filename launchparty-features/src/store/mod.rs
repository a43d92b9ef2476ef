//! Feature store backends
//!
//! A [`FeatureStore`] exposes the five atomic protocol operations plus the
//! plain set commands the engine passes through. Every method is one atomic
//! unit on the backing store; no method observes a half-applied update of
//! another.
//!
//! - **Redis**: Lua scripts over a pooled connection (default)
//! - **Memory**: Single-process store guarded by one lock (tests, embedding)

mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use memory::MemoryFeatureStore;
#[cfg(feature = "redis")]
pub use redis::RedisFeatureStore;

use crate::error::FeatureResult;
use async_trait::async_trait;

/// Reply of the accounts-where-feature-is-launched operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchedAccounts {
    /// The feature is in the global set; accounts are not enumerated.
    All,
    /// Accounts that enabled the feature individually, in store order.
    Accounts(Vec<String>),
}

impl LaunchedAccounts {
    /// Flatten into a list, using `"*"` for [`LaunchedAccounts::All`].
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::All => vec![crate::keys::WILDCARD_ACCOUNT.to_string()],
            Self::Accounts(accounts) => accounts,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Trait for feature store backends
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Add `feature` to the set at `account_key` and `account` to the set at
    /// `feature_key`, atomically.
    async fn launch_for_one_account(
        &self,
        account_key: &str,
        feature_key: &str,
        account: &str,
        feature: &str,
    ) -> FeatureResult<()>;

    /// Remove `feature` from the set at `account_key` and `account` from the
    /// set at `feature_key`, atomically.
    async fn revoke_from_one_account(
        &self,
        account_key: &str,
        feature_key: &str,
        account: &str,
        feature: &str,
    ) -> FeatureResult<()>;

    /// Whether `feature` is in the set at `global_key` or the set at
    /// `account_key`, read atomically.
    async fn is_launched_in_one_account(
        &self,
        global_key: &str,
        account_key: &str,
        feature: &str,
    ) -> FeatureResult<bool>;

    /// Remove `feature` from the global set and from `account_prefix + M` for
    /// every member `M` of the set at `feature_key`, then delete that set.
    /// Returns the number of accounts cleaned.
    async fn revoke_from_all_accounts(
        &self,
        global_key: &str,
        feature_key: &str,
        feature: &str,
        account_prefix: &str,
    ) -> FeatureResult<usize>;

    /// [`LaunchedAccounts::All`] if `feature` is in the global set, otherwise
    /// the members of the set at `feature_key`.
    async fn accounts_where_launched(
        &self,
        global_key: &str,
        feature_key: &str,
        feature: &str,
    ) -> FeatureResult<LaunchedAccounts>;

    /// Set add. Returns whether the member was newly added.
    async fn set_add(&self, key: &str, member: &str) -> FeatureResult<bool>;

    /// Set remove. Returns whether the member was present.
    async fn set_remove(&self, key: &str, member: &str) -> FeatureResult<bool>;

    /// Set membership test.
    async fn set_is_member(&self, key: &str, member: &str) -> FeatureResult<bool>;

    /// Union of the sets at `keys`.
    async fn set_union(&self, keys: &[&str]) -> FeatureResult<Vec<String>>;

    /// Members of the set at `key`.
    async fn set_members(&self, key: &str) -> FeatureResult<Vec<String>>;

    /// Round trip to the store.
    async fn ping(&self) -> FeatureResult<()>;

    /// Release the store. Later calls fail with a disconnected error.
    async fn close(&self) -> FeatureResult<()> {
        Ok(())
    }

    /// Get store type name for debugging
    fn store_type(&self) -> &'static str;
}
