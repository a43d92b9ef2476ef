//! Connection pool setup.

use bb8::{Pool, PooledConnection};
use bb8_redis::RedisConnectionManager;
use tracing::{debug, info};

use crate::{RedisConfig, RedisError, Result};

/// Pool of multiplexed Redis connections.
pub type RedisPool = Pool<RedisConnectionManager>;

/// A connection checked out of a [`RedisPool`].
pub type RedisConnection<'a> = PooledConnection<'a, RedisConnectionManager>;

/// Validate `config`, build a pool from it and PING through the pool.
///
/// Returns only once the server has answered, so a pool handed out by this
/// function has been connected at least once.
pub(crate) async fn connect(config: &RedisConfig) -> Result<RedisPool> {
    config.validate()?;

    let manager = RedisConnectionManager::new(config.connection_url()?)
        .map_err(|e| RedisError::Config(e.to_string()))?;

    debug!(
        address = %config.address(),
        pool_size = config.pool_size,
        min_idle = ?config.min_idle,
        "Opening Redis pool"
    );

    let pool = Pool::builder()
        .max_size(config.pool_size)
        .min_idle(config.min_idle)
        .connection_timeout(config.connection_timeout)
        .build(manager)
        .await
        .map_err(|e| RedisError::Connection(e.to_string()))?;

    let mut conn = pool.get().await?;
    let pong: String = redis::cmd("PING")
        .query_async(&mut *conn)
        .await
        .map_err(|e| RedisError::Connection(e.to_string()))?;
    drop(conn);

    info!(
        address = %config.address(),
        reply = %pong,
        "Connection has been established with Redis"
    );

    Ok(pool)
}
