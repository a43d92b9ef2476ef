//! # LaunchParty Redis
//!
//! Redis client used by the LaunchParty feature store.
//!
//! ## Features
//!
//! - **Connection Pooling**: Efficient connection management with bb8
//! - **Explicit Lifecycle**: `open` / `close` with a terminal `Disconnected` state
//! - **Atomic Scripts**: Lua script execution through `EVALSHA`
//! - **Set Commands**: The set primitives the feature protocol is built on
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use launchparty_redis::{RedisConfig, RedisService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RedisConfig::builder()
//!         .host("localhost")
//!         .port(6379)
//!         .password("secret")
//!         .build();
//!
//!     let redis = RedisService::open(config).await?;
//!     redis.sadd("feature_for_all", "dark-mode").await?;
//!
//!     // Connection failures are terminal and observable.
//!     let mut states = redis.watch_state();
//!     tokio::spawn(async move {
//!         while states.changed().await.is_ok() {
//!             eprintln!("redis state: {:?}", *states.borrow());
//!         }
//!     });
//!
//!     redis.close();
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod pool;
mod service;

pub use config::{DEFAULT_HOST, DEFAULT_PORT, RedisConfig, RedisConfigBuilder};
pub use error::{RedisError, Result};
pub use pool::{RedisConnection, RedisPool};
pub use service::{ConnectionState, PoolStats, RedisService};

// Re-export redis crate for convenience
pub use redis;

/// Prelude for common imports.
///
/// ```
/// use launchparty_redis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{RedisConfig, RedisConfigBuilder};
    pub use crate::error::{RedisError, Result};
    pub use crate::service::{ConnectionState, RedisService};
}
