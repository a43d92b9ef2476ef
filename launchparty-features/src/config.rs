//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};
use crate::keys::{DEFAULT_ACCOUNT_PREFIX, DEFAULT_FEATURE_PREFIX, GLOBAL_FEATURES_KEY, KeySpace};

#[cfg(feature = "redis")]
use launchparty_redis::RedisConfig;

/// Configuration for a [`FeatureStateEngine`](crate::FeatureStateEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchPartyConfig {
    /// Store connection settings.
    #[cfg(feature = "redis")]
    pub redis: RedisConfig,
    /// Common prefix for all account keys, e.g. `LP:Account:`.
    pub account_prefix: String,
    /// Common prefix for all feature keys, e.g. `LP:Feature:`.
    pub feature_prefix: String,
}

impl Default for LaunchPartyConfig {
    fn default() -> Self {
        Self {
            #[cfg(feature = "redis")]
            redis: RedisConfig::default(),
            account_prefix: DEFAULT_ACCOUNT_PREFIX.to_string(),
            feature_prefix: DEFAULT_FEATURE_PREFIX.to_string(),
        }
    }
}

impl LaunchPartyConfig {
    /// Create a builder.
    pub fn builder() -> LaunchPartyConfigBuilder {
        LaunchPartyConfigBuilder::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `LAUNCHPARTY_ACCOUNT_PREFIX`, `LAUNCHPARTY_FEATURE_PREFIX` and,
    /// with the `redis` feature, the `REDIS_*` variables.
    pub fn from_env() -> FeatureResult<LaunchPartyConfigBuilder> {
        let mut builder = LaunchPartyConfigBuilder::default();

        #[cfg(feature = "redis")]
        {
            builder = builder.redis(RedisConfig::from_env()?.build());
        }

        if let Ok(prefix) = std::env::var("LAUNCHPARTY_ACCOUNT_PREFIX") {
            builder = builder.account_prefix(prefix);
        }

        if let Ok(prefix) = std::env::var("LAUNCHPARTY_FEATURE_PREFIX") {
            builder = builder.feature_prefix(prefix);
        }

        Ok(builder)
    }

    /// Reject prefixes that would make account, feature and global keys collide.
    pub fn validate(&self) -> FeatureResult<()> {
        if self.account_prefix.is_empty() {
            return Err(FeatureError::config("account prefix must not be empty"));
        }
        if self.feature_prefix.is_empty() {
            return Err(FeatureError::config("feature prefix must not be empty"));
        }
        if self.account_prefix.starts_with(&self.feature_prefix)
            || self.feature_prefix.starts_with(&self.account_prefix)
        {
            return Err(FeatureError::config(format!(
                "account prefix '{}' and feature prefix '{}' must not overlap",
                self.account_prefix, self.feature_prefix
            )));
        }
        if GLOBAL_FEATURES_KEY.starts_with(&self.account_prefix)
            || GLOBAL_FEATURES_KEY.starts_with(&self.feature_prefix)
        {
            return Err(FeatureError::config(format!(
                "prefixes must not shadow the '{}' key",
                GLOBAL_FEATURES_KEY
            )));
        }
        #[cfg(feature = "redis")]
        self.redis.validate()?;
        Ok(())
    }

    /// Key space derived from the configured prefixes.
    pub fn key_space(&self) -> KeySpace {
        KeySpace::new(&self.account_prefix, &self.feature_prefix)
    }
}

/// Builder for [`LaunchPartyConfig`].
#[derive(Debug, Default)]
pub struct LaunchPartyConfigBuilder {
    config: LaunchPartyConfig,
}

impl LaunchPartyConfigBuilder {
    /// Set the store connection settings.
    #[cfg(feature = "redis")]
    pub fn redis(mut self, redis: RedisConfig) -> Self {
        self.config.redis = redis;
        self
    }

    /// Set the account key prefix.
    pub fn account_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.account_prefix = prefix.into();
        self
    }

    /// Set the feature key prefix.
    pub fn feature_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.feature_prefix = prefix.into();
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> FeatureResult<LaunchPartyConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
