//! Feature-state engine.
//!
//! Maps the public feature-flag operations onto single atomic calls against a
//! [`FeatureStore`]. The engine holds no state besides the key space; every
//! method is its own atomic unit, and two calls in a row are not atomic as a
//! pair.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::FeatureResult;
use crate::keys::KeySpace;
use crate::store::{FeatureStore, LaunchedAccounts, MemoryFeatureStore};

#[cfg(feature = "redis")]
use crate::{config::LaunchPartyConfig, store::RedisFeatureStore};

/// How [`FeatureStateEngine::revoke_feature_from_all_accounts`] treats
/// accounts that enabled the feature individually.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RevokeMode {
    /// Remove the feature from the global set only. Accounts that enabled it
    /// individually keep it.
    #[default]
    GlobalOnly,
    /// Also remove the feature from every account that enabled it
    /// individually, and clear its account index, in one atomic step.
    CleanupAccounts,
}

impl From<bool> for RevokeMode {
    fn from(cleanup_individual_accounts: bool) -> Self {
        if cleanup_individual_accounts {
            Self::CleanupAccounts
        } else {
            Self::GlobalOnly
        }
    }
}

/// Feature toggles for single accounts and for all accounts.
pub struct FeatureStateEngine<S: FeatureStore> {
    store: Arc<S>,
    keys: KeySpace,
}

impl<S: FeatureStore> Clone for FeatureStateEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            keys: self.keys.clone(),
        }
    }
}

#[cfg(feature = "redis")]
impl FeatureStateEngine<RedisFeatureStore> {
    /// Validate `config`, open the Redis pool and verify it.
    ///
    /// Connection failures are returned, never raised later from a
    /// background task.
    pub async fn open(config: LaunchPartyConfig) -> FeatureResult<Self> {
        config.validate()?;
        let store = RedisFeatureStore::open(config.redis.clone()).await?;
        info!(
            account_prefix = %config.account_prefix,
            feature_prefix = %config.feature_prefix,
            "Feature state engine ready"
        );
        Ok(Self::with_store(store, config.key_space()))
    }

    /// Current connection state of the Redis link.
    pub fn connection_state(&self) -> launchparty_redis::ConnectionState {
        self.store.state()
    }

    /// Subscribe to connection state transitions of the Redis link.
    pub fn watch_connection(
        &self,
    ) -> tokio::sync::watch::Receiver<launchparty_redis::ConnectionState> {
        self.store.watch_state()
    }
}

impl FeatureStateEngine<MemoryFeatureStore> {
    /// Engine over a fresh in-memory store with the default key space.
    pub fn in_memory() -> Self {
        Self::with_store(MemoryFeatureStore::new(), KeySpace::default())
    }
}

impl<S: FeatureStore> FeatureStateEngine<S> {
    /// Create an engine over any store.
    pub fn with_store(store: S, keys: KeySpace) -> Self {
        Self::from_shared(Arc::new(store), keys)
    }

    /// Create an engine over a store shared with other owners.
    pub fn from_shared(store: Arc<S>, keys: KeySpace) -> Self {
        debug!(store = store.store_type(), "Creating feature state engine");
        Self { store, keys }
    }

    /// The key space used to name sets.
    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Key of the set of features enabled for `account`.
    pub fn account_key(&self, account: &str) -> String {
        self.keys.account_key(account)
    }

    /// Key of the set of accounts that enabled `feature` individually.
    pub fn feature_key(&self, feature: &str) -> String {
        self.keys.feature_key(feature)
    }

    /// Key of the global feature set.
    pub fn global_key(&self) -> &'static str {
        self.keys.global_key()
    }

    /// Round trip to the store.
    pub async fn health_check(&self) -> FeatureResult<()> {
        self.store.ping().await
    }

    /// Close the store. Later calls on any clone of this engine fail.
    pub async fn close(self) -> FeatureResult<()> {
        self.store.close().await
    }

    /// Enable `feature` for `account`. Idempotent.
    pub async fn launch_feature_for_account(
        &self,
        feature: &str,
        account: &str,
    ) -> FeatureResult<()> {
        debug!(feature = %feature, account = %account, "Launching feature for account");
        self.store
            .launch_for_one_account(
                &self.keys.account_key(account),
                &self.keys.feature_key(feature),
                account,
                feature,
            )
            .await
    }

    /// Disable `feature` for `account`. Revoking an absent feature succeeds.
    pub async fn revoke_feature_from_account(
        &self,
        feature: &str,
        account: &str,
    ) -> FeatureResult<()> {
        debug!(feature = %feature, account = %account, "Revoking feature from account");
        self.store
            .revoke_from_one_account(
                &self.keys.account_key(account),
                &self.keys.feature_key(feature),
                account,
                feature,
            )
            .await
    }

    /// Whether `feature` is enabled for `account`, either globally or
    /// individually. Both sets are read in one atomic step.
    pub async fn is_feature_launched_for_account(
        &self,
        feature: &str,
        account: &str,
    ) -> FeatureResult<bool> {
        self.store
            .is_launched_in_one_account(
                self.keys.global_key(),
                &self.keys.account_key(account),
                feature,
            )
            .await
    }

    /// Enable `feature` for every account. Per-account sets are untouched.
    pub async fn launch_feature_for_all_accounts(&self, feature: &str) -> FeatureResult<()> {
        debug!(feature = %feature, "Launching feature for all accounts");
        self.store.set_add(self.keys.global_key(), feature).await?;
        Ok(())
    }

    /// Disable `feature` globally.
    ///
    /// With [`RevokeMode::CleanupAccounts`] the feature is also removed from
    /// every account that enabled it individually. Returns the number of
    /// accounts cleaned, always 0 for [`RevokeMode::GlobalOnly`].
    pub async fn revoke_feature_from_all_accounts(
        &self,
        feature: &str,
        mode: impl Into<RevokeMode>,
    ) -> FeatureResult<usize> {
        match mode.into() {
            RevokeMode::GlobalOnly => {
                debug!(feature = %feature, "Revoking feature from all accounts");
                self.store.set_remove(self.keys.global_key(), feature).await?;
                Ok(0)
            }
            RevokeMode::CleanupAccounts => {
                let cleaned = self
                    .store
                    .revoke_from_all_accounts(
                        self.keys.global_key(),
                        &self.keys.feature_key(feature),
                        feature,
                        self.keys.account_prefix(),
                    )
                    .await?;
                info!(
                    feature = %feature,
                    accounts = cleaned,
                    "Revoked feature from all accounts with cleanup"
                );
                Ok(cleaned)
            }
        }
    }

    /// Accounts where `feature` is enabled, or `["*"]` when it is enabled
    /// for all accounts. Order is store-defined.
    pub async fn accounts_where_feature_is_launched(
        &self,
        feature: &str,
    ) -> FeatureResult<Vec<String>> {
        Ok(self.launched_accounts(feature).await?.into_vec())
    }

    /// Typed form of [`accounts_where_feature_is_launched`](Self::accounts_where_feature_is_launched).
    pub async fn launched_accounts(&self, feature: &str) -> FeatureResult<LaunchedAccounts> {
        self.store
            .accounts_where_launched(
                self.keys.global_key(),
                &self.keys.feature_key(feature),
                feature,
            )
            .await
    }

    /// Features enabled for `account`, individually or globally.
    pub async fn features_launched_for_account(&self, account: &str) -> FeatureResult<Vec<String>> {
        let account_key = self.keys.account_key(account);
        self.store
            .set_union(&[account_key.as_str(), self.keys.global_key()])
            .await
    }

    /// Whether `feature` is enabled for every account.
    pub async fn is_feature_launched_for_all_accounts(&self, feature: &str) -> FeatureResult<bool> {
        self.store
            .set_is_member(self.keys.global_key(), feature)
            .await
    }

    /// Features enabled for every account.
    pub async fn features_launched_for_all_accounts(&self) -> FeatureResult<Vec<String>> {
        self.store.set_members(self.keys.global_key()).await
    }
}

impl<S: FeatureStore> std::fmt::Debug for FeatureStateEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureStateEngine")
            .field("store", &self.store.store_type())
            .field("keys", &self.keys)
            .finish()
    }
}
