// LaunchParty - feature toggles on top of Redis sets
//
// This library enables or disables named features for single accounts or for
// all accounts, keeping both views consistent through atomic server-side
// scripts.

// Re-export core functionality
pub use launchparty_features::*;

// Re-export optional crates
#[cfg(feature = "redis")]
pub use launchparty_redis;

#[cfg(feature = "log")]
pub use launchparty_log;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        FeatureError, FeatureResult, FeatureStateEngine, FeatureStore, KeySpace,
        LaunchPartyConfig, LaunchedAccounts, MemoryFeatureStore, RevokeMode,
    };

    #[cfg(feature = "redis")]
    pub use crate::RedisFeatureStore;

    #[cfg(feature = "redis")]
    pub use launchparty_redis::{ConnectionState, RedisConfig};

    pub use async_trait::async_trait;
}
