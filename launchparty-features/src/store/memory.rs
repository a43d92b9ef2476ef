//! In-memory feature store
//!
//! All sets sit behind a single lock, so every trait call is atomic with
//! respect to every other, which is what Redis guarantees for one script.
//! Suitable for tests and single-process embedding.

use crate::error::{FeatureError, FeatureResult};
use crate::store::{FeatureStore, LaunchedAccounts};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

type Sets = HashMap<String, HashSet<String>>;

/// In-memory feature store
pub struct MemoryFeatureStore {
    sets: Mutex<Sets>,
    closed: AtomicBool,
}

impl MemoryFeatureStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        debug!("Creating new in-memory feature store");
        Self {
            sets: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Every key currently holding a non-empty set.
    pub fn keys(&self) -> Vec<String> {
        self.sets.lock().keys().cloned().collect()
    }

    /// Copy of every set, taken atomically.
    pub fn snapshot(&self) -> HashMap<String, HashSet<String>> {
        self.sets.lock().clone()
    }

    /// Remove every set (the FLUSHALL of this store).
    pub fn flush(&self) {
        self.sets.lock().clear();
    }

    fn with_sets<T>(&self, f: impl FnOnce(&mut Sets) -> T) -> FeatureResult<T> {
        if self.closed.load(Ordering::Acquire) {
            return Err(FeatureError::Disconnected(
                "in-memory store was closed".to_string(),
            ));
        }
        let mut sets = self.sets.lock();
        Ok(f(&mut sets))
    }
}

impl Default for MemoryFeatureStore {
    fn default() -> Self {
        Self::new()
    }
}

fn add(sets: &mut Sets, key: &str, member: &str) -> bool {
    sets.entry(key.to_string())
        .or_default()
        .insert(member.to_string())
}

// Empty sets are dropped, as Redis deletes a key whose set becomes empty.
fn remove(sets: &mut Sets, key: &str, member: &str) -> bool {
    let Some(set) = sets.get_mut(key) else {
        return false;
    };
    let removed = set.remove(member);
    if set.is_empty() {
        sets.remove(key);
    }
    removed
}

fn contains(sets: &Sets, key: &str, member: &str) -> bool {
    sets.get(key).is_some_and(|set| set.contains(member))
}

fn members(sets: &Sets, key: &str) -> Vec<String> {
    sets.get(key)
        .map(|set| set.iter().cloned().collect())
        .unwrap_or_default()
}

#[async_trait]
impl FeatureStore for MemoryFeatureStore {
    async fn launch_for_one_account(
        &self,
        account_key: &str,
        feature_key: &str,
        account: &str,
        feature: &str,
    ) -> FeatureResult<()> {
        trace!(account_key = %account_key, feature_key = %feature_key, "Memory launch for one account");
        self.with_sets(|sets| {
            add(sets, account_key, feature);
            add(sets, feature_key, account);
        })
    }

    async fn revoke_from_one_account(
        &self,
        account_key: &str,
        feature_key: &str,
        account: &str,
        feature: &str,
    ) -> FeatureResult<()> {
        trace!(account_key = %account_key, feature_key = %feature_key, "Memory revoke from one account");
        self.with_sets(|sets| {
            remove(sets, account_key, feature);
            remove(sets, feature_key, account);
        })
    }

    async fn is_launched_in_one_account(
        &self,
        global_key: &str,
        account_key: &str,
        feature: &str,
    ) -> FeatureResult<bool> {
        self.with_sets(|sets| {
            contains(sets, global_key, feature) || contains(sets, account_key, feature)
        })
    }

    async fn revoke_from_all_accounts(
        &self,
        global_key: &str,
        feature_key: &str,
        feature: &str,
        account_prefix: &str,
    ) -> FeatureResult<usize> {
        self.with_sets(|sets| {
            remove(sets, global_key, feature);
            let accounts = sets.remove(feature_key).unwrap_or_default();
            for account in &accounts {
                remove(sets, &format!("{}{}", account_prefix, account), feature);
            }
            accounts.len()
        })
    }

    async fn accounts_where_launched(
        &self,
        global_key: &str,
        feature_key: &str,
        feature: &str,
    ) -> FeatureResult<LaunchedAccounts> {
        self.with_sets(|sets| {
            if contains(sets, global_key, feature) {
                LaunchedAccounts::All
            } else {
                LaunchedAccounts::Accounts(members(sets, feature_key))
            }
        })
    }

    async fn set_add(&self, key: &str, member: &str) -> FeatureResult<bool> {
        self.with_sets(|sets| add(sets, key, member))
    }

    async fn set_remove(&self, key: &str, member: &str) -> FeatureResult<bool> {
        self.with_sets(|sets| remove(sets, key, member))
    }

    async fn set_is_member(&self, key: &str, member: &str) -> FeatureResult<bool> {
        self.with_sets(|sets| contains(sets, key, member))
    }

    async fn set_union(&self, keys: &[&str]) -> FeatureResult<Vec<String>> {
        self.with_sets(|sets| {
            let union: HashSet<&String> = keys
                .iter()
                .filter_map(|key| sets.get(*key))
                .flatten()
                .collect();
            union.into_iter().cloned().collect()
        })
    }

    async fn set_members(&self, key: &str) -> FeatureResult<Vec<String>> {
        self.with_sets(|sets| members(sets, key))
    }

    async fn ping(&self) -> FeatureResult<()> {
        self.with_sets(|_| ())
    }

    async fn close(&self) -> FeatureResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("In-memory feature store closed");
        }
        Ok(())
    }

    fn store_type(&self) -> &'static str {
        "memory"
    }
}

impl std::fmt::Debug for MemoryFeatureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryFeatureStore")
            .field("keys", &self.sets.lock().len())
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}
