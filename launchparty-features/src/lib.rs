//! Feature toggles for LaunchParty
//!
//! Enable or disable a named feature for one account, for all accounts, or
//! globally, and query the resulting state. Two overlapping pieces of state,
//! "enabled for account X" and "enabled for all accounts", are kept consistent
//! by atomic server-side scripts.
//!
//! # Features
//!
//! - **Per-account toggles** - account → features and feature → accounts kept in lock-step
//! - **Global toggles** - one set overriding every account
//! - **Cleanup revoke** - drop a feature everywhere in one atomic step
//! - **Pluggable stores** - Redis (default) or in-memory
//!
//! # Quick Start
//!
//! ```
//! use launchparty_features::*;
//!
//! # tokio_test::block_on(async {
//! let engine = FeatureStateEngine::in_memory();
//!
//! engine.launch_feature_for_account("feat-A", "acc-1").await?;
//! assert_eq!(engine.accounts_where_feature_is_launched("feat-A").await?, vec!["acc-1"]);
//!
//! engine.launch_feature_for_all_accounts("feat-A").await?;
//! assert_eq!(engine.accounts_where_feature_is_launched("feat-A").await?, vec!["*"]);
//! # Ok::<(), FeatureError>(())
//! # }).unwrap();
//! ```
//!
//! # Redis
//!
//! ```rust,ignore
//! use launchparty_features::*;
//!
//! let config = LaunchPartyConfig::from_env()?.build()?;
//! let engine = FeatureStateEngine::open(config).await?;
//!
//! engine.revoke_feature_from_all_accounts("feat-A", RevokeMode::CleanupAccounts).await?;
//! engine.close().await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod keys;
#[cfg(feature = "redis")]
pub mod scripts;
pub mod store;

pub use config::{LaunchPartyConfig, LaunchPartyConfigBuilder};
pub use engine::{FeatureStateEngine, RevokeMode};
pub use error::{FeatureError, FeatureResult};
pub use keys::{
    DEFAULT_ACCOUNT_PREFIX, DEFAULT_FEATURE_PREFIX, GLOBAL_FEATURES_KEY, KeySpace,
    WILDCARD_ACCOUNT,
};
pub use store::{FeatureStore, LaunchedAccounts, MemoryFeatureStore};
#[cfg(feature = "redis")]
pub use store::RedisFeatureStore;
