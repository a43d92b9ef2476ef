//! Redis feature store
//!
//! Runs the protocol operations as Lua scripts so that multi-key updates are
//! atomic on the server. Requires the `redis` feature to be enabled.

use crate::error::{FeatureError, FeatureResult};
use crate::scripts;
use crate::store::{FeatureStore, LaunchedAccounts};
use async_trait::async_trait;
use launchparty_redis::{ConnectionState, RedisConfig, RedisService};
use redis::Value;
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// Redis-backed feature store
pub struct RedisFeatureStore {
    redis: RedisService,
}

impl RedisFeatureStore {
    /// Open a pooled connection to Redis.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be built or the first PING fails.
    pub async fn open(config: RedisConfig) -> FeatureResult<Self> {
        debug!(address = %config.address(), "Connecting to Redis for feature state");
        let redis = RedisService::open(config).await?;
        Ok(Self { redis })
    }

    /// Wrap an already opened service.
    pub fn from_service(redis: RedisService) -> Self {
        Self { redis }
    }

    /// The underlying service.
    pub fn service(&self) -> &RedisService {
        &self.redis
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.redis.state()
    }

    /// Subscribe to connection state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.redis.watch_state()
    }
}

fn decode_accounts(reply: Value) -> FeatureResult<LaunchedAccounts> {
    match reply {
        Value::Int(1) => Ok(LaunchedAccounts::All),
        Value::Array(items) => items
            .into_iter()
            .map(decode_member)
            .collect::<FeatureResult<Vec<_>>>()
            .map(LaunchedAccounts::Accounts),
        Value::Nil => Ok(LaunchedAccounts::Accounts(Vec::new())),
        other => Err(FeatureError::UnexpectedReply(format!("{:?}", other))),
    }
}

fn decode_member(item: Value) -> FeatureResult<String> {
    match item {
        Value::BulkString(bytes) => String::from_utf8(bytes)
            .map_err(|e| FeatureError::UnexpectedReply(e.to_string())),
        Value::SimpleString(s) => Ok(s),
        other => Err(FeatureError::UnexpectedReply(format!("{:?}", other))),
    }
}

#[async_trait]
impl FeatureStore for RedisFeatureStore {
    async fn launch_for_one_account(
        &self,
        account_key: &str,
        feature_key: &str,
        account: &str,
        feature: &str,
    ) -> FeatureResult<()> {
        trace!(account_key = %account_key, feature_key = %feature_key, "Redis launch for one account");
        let _: i64 = self
            .redis
            .eval_script(
                &scripts::LAUNCH_FOR_ONE_ACCOUNT,
                &[account_key, feature_key],
                &[account, feature],
            )
            .await?;
        Ok(())
    }

    async fn revoke_from_one_account(
        &self,
        account_key: &str,
        feature_key: &str,
        account: &str,
        feature: &str,
    ) -> FeatureResult<()> {
        trace!(account_key = %account_key, feature_key = %feature_key, "Redis revoke from one account");
        let _: i64 = self
            .redis
            .eval_script(
                &scripts::REVOKE_FROM_ONE_ACCOUNT,
                &[account_key, feature_key],
                &[account, feature],
            )
            .await?;
        Ok(())
    }

    async fn is_launched_in_one_account(
        &self,
        global_key: &str,
        account_key: &str,
        feature: &str,
    ) -> FeatureResult<bool> {
        let result: i64 = self
            .redis
            .eval_script(
                &scripts::IS_LAUNCHED_IN_ONE_ACCOUNT,
                &[global_key, account_key],
                &[feature],
            )
            .await?;
        Ok(result == 1)
    }

    async fn revoke_from_all_accounts(
        &self,
        global_key: &str,
        feature_key: &str,
        feature: &str,
        account_prefix: &str,
    ) -> FeatureResult<usize> {
        let cleaned: i64 = self
            .redis
            .eval_script(
                &scripts::REVOKE_FROM_ALL_ACCOUNTS,
                &[global_key, feature_key],
                &[feature, account_prefix],
            )
            .await?;
        usize::try_from(cleaned).map_err(|_| FeatureError::UnexpectedReply(cleaned.to_string()))
    }

    async fn accounts_where_launched(
        &self,
        global_key: &str,
        feature_key: &str,
        feature: &str,
    ) -> FeatureResult<LaunchedAccounts> {
        let reply: Value = self
            .redis
            .eval_script(
                &scripts::ACCOUNTS_WHERE_LAUNCHED,
                &[global_key, feature_key],
                &[feature],
            )
            .await?;
        decode_accounts(reply)
    }

    async fn set_add(&self, key: &str, member: &str) -> FeatureResult<bool> {
        Ok(self.redis.sadd(key, member).await?)
    }

    async fn set_remove(&self, key: &str, member: &str) -> FeatureResult<bool> {
        Ok(self.redis.srem(key, member).await?)
    }

    async fn set_is_member(&self, key: &str, member: &str) -> FeatureResult<bool> {
        Ok(self.redis.sismember(key, member).await?)
    }

    async fn set_union(&self, keys: &[&str]) -> FeatureResult<Vec<String>> {
        Ok(self.redis.sunion(keys).await?)
    }

    async fn set_members(&self, key: &str) -> FeatureResult<Vec<String>> {
        Ok(self.redis.smembers(key).await?)
    }

    async fn ping(&self) -> FeatureResult<()> {
        Ok(self.redis.health_check().await?)
    }

    async fn close(&self) -> FeatureResult<()> {
        self.redis.close();
        info!("Redis feature store closed");
        Ok(())
    }

    fn store_type(&self) -> &'static str {
        "redis"
    }
}

impl std::fmt::Debug for RedisFeatureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisFeatureStore")
            .field("redis", &self.redis)
            .finish()
    }
}
