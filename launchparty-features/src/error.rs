//! Error types for feature-state operations.

use thiserror::Error;

/// Result type for feature-state operations.
pub type FeatureResult<T> = Result<T, FeatureError>;

/// Feature-state errors.
///
/// Operating on an absent feature or account is never an error. Everything
/// here is surfaced to the caller as-is; nothing is retried.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Transport-level failure talking to the store.
    #[error("Store connection error: {0}")]
    Connection(String),

    /// The store link failed earlier or was closed; the engine is unusable.
    #[error("Store disconnected: {0}")]
    Disconnected(String),

    /// An atomic script or command was rejected by the store.
    #[error("Script execution error: {0}")]
    Script(String),

    /// The store replied with a shape the protocol does not define.
    #[error("Unexpected reply from store: {0}")]
    UnexpectedReply(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FeatureError {
    /// Create a new script error
    pub fn script<S: Into<String>>(msg: S) -> Self {
        Self::Script(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error means the store link is gone.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Disconnected(_))
    }
}

#[cfg(feature = "redis")]
impl From<launchparty_redis::RedisError> for FeatureError {
    fn from(err: launchparty_redis::RedisError) -> Self {
        use launchparty_redis::RedisError;

        match err {
            RedisError::Disconnected(reason) => Self::Disconnected(reason),
            RedisError::Closed => Self::Disconnected("store was closed".to_string()),
            RedisError::Config(msg) => Self::Config(msg),
            other if other.is_connection_error() => Self::Connection(other.to_string()),
            other => Self::Script(other.to_string()),
        }
    }
}
