//! Redis service with an explicit connection lifecycle.

use redis::{AsyncCommands, FromRedisValue};
use std::future::Future;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::{
    pool::{self, RedisConnection, RedisPool},
    RedisConfig, RedisError, Result,
};

/// Lifecycle state of a [`RedisService`].
///
/// `Connected` is the only usable state. `Disconnected` and `Closed` are
/// terminal: once entered, every call fails without touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// The pool is up and commands are being served.
    Connected,
    /// A transport-level failure was observed.
    Disconnected {
        /// Error that caused the transition.
        reason: String,
    },
    /// [`RedisService::close`] was called.
    Closed,
}

impl ConnectionState {
    /// Whether commands may still be issued.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Redis service providing the connection pool and the set/script commands
/// the feature store needs.
///
/// Connection errors are never swallowed or retried: the first one moves the
/// service into [`ConnectionState::Disconnected`], which callers can poll via
/// [`state`](Self::state) or await via [`watch_state`](Self::watch_state).
pub struct RedisService {
    config: RedisConfig,
    pool: RedisPool,
    state: watch::Sender<ConnectionState>,
}

impl RedisService {
    /// Open a pool against the configured server and verify it with a PING.
    ///
    /// Invalid pool settings are returned as [`RedisError::Config`] before
    /// any connection is attempted.
    pub async fn open(config: RedisConfig) -> Result<Self> {
        let pool = pool::connect(&config).await?;
        Ok(Self::from_pool(config, pool))
    }

    /// Create from an existing pool. The pool is assumed to be connected.
    pub fn from_pool(config: RedisConfig, pool: RedisPool) -> Self {
        let (state, _) = watch::channel(ConnectionState::Connected);
        Self {
            config,
            pool,
            state,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Subscribe to lifecycle transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Close the service. Subsequent calls fail with [`RedisError::Closed`].
    pub fn close(&self) {
        let closed = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Closed {
                false
            } else {
                *state = ConnectionState::Closed;
                true
            }
        });

        if closed {
            info!(address = %self.config.address(), "Redis service closed");
        }
    }

    /// Get a connection from the pool.
    pub async fn get(&self) -> Result<RedisConnection<'_>> {
        self.ensure_connected()?;
        self.pool.get().await.map_err(|e| self.observe(e.into()))
    }

    /// Run a single command, bounded by the configured command timeout.
    pub async fn query<T: FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T> {
        let mut conn = self.get().await?;
        self.bounded(cmd.query_async(&mut *conn)).await
    }

    /// Execute a Lua script atomically.
    pub async fn eval_script<T: FromRedisValue>(
        &self,
        script: &redis::Script,
        keys: &[&str],
        args: &[&str],
    ) -> Result<T> {
        let mut conn = self.get().await?;
        let mut invocation = script.prepare_invoke();
        invocation.key(keys).arg(args);
        self.bounded(invocation.invoke_async(&mut *conn)).await
    }

    /// Check if the connection is healthy.
    pub async fn health_check(&self) -> Result<()> {
        let _: String = self.query(&redis::cmd("PING")).await?;
        debug!("Connected to Redis and ready to use");
        Ok(())
    }

    /// Get pool statistics.
    pub fn pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections: state.connections,
            idle_connections: state.idle_connections,
        }
    }

    /// Set add. Returns whether the member was newly added.
    pub async fn sadd(&self, key: &str, member: &str) -> Result<bool> {
        let mut conn = self.get().await?;
        let added: u64 = self.bounded(conn.sadd(key, member)).await?;
        Ok(added > 0)
    }

    /// Set remove. Returns whether the member was present.
    pub async fn srem(&self, key: &str, member: &str) -> Result<bool> {
        let mut conn = self.get().await?;
        let removed: u64 = self.bounded(conn.srem(key, member)).await?;
        Ok(removed > 0)
    }

    /// Set is member.
    pub async fn sismember(&self, key: &str, member: &str) -> Result<bool> {
        let mut conn = self.get().await?;
        self.bounded(conn.sismember(key, member)).await
    }

    /// Set union.
    pub async fn sunion(&self, keys: &[&str]) -> Result<Vec<String>> {
        let mut conn = self.get().await?;
        self.bounded(conn.sunion(keys)).await
    }

    /// Set members.
    pub async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.get().await?;
        self.bounded(conn.smembers(key)).await
    }

    fn ensure_connected(&self) -> Result<()> {
        match &*self.state.borrow() {
            ConnectionState::Connected => Ok(()),
            ConnectionState::Disconnected { reason } => {
                Err(RedisError::Disconnected(reason.clone()))
            }
            ConnectionState::Closed => Err(RedisError::Closed),
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        let err = match timeout(self.config.command_timeout, fut).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => RedisError::Redis(e),
            Err(_) => RedisError::Timeout,
        };
        Err(self.observe(err))
    }

    fn observe(&self, err: RedisError) -> RedisError {
        if !err.is_connection_error() {
            return err;
        }

        let reason = err.to_string();
        let disconnected = self.state.send_if_modified(|state| {
            if state.is_connected() {
                *state = ConnectionState::Disconnected {
                    reason: reason.clone(),
                };
                true
            } else {
                false
            }
        });

        if disconnected {
            error!(
                address = %self.config.address(),
                error = %reason,
                "Lost connection with Redis"
            );
        }

        err
    }
}

impl std::fmt::Debug for RedisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisService")
            .field("address", &self.config.address())
            .field("state", &*self.state.borrow())
            .finish()
    }
}

/// Connection pool statistics.
#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Total connections.
    pub connections: u32,
    /// Idle connections.
    pub idle_connections: u32,
}
