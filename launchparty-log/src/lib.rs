//! LaunchParty Logging
//!
//! Installs a `tracing` subscriber configured from the environment. Library
//! crates only emit events; applications call [`init`] once at startup.
//!
//! # Usage
//!
//! ```rust
//! launchparty_log::init();
//! tracing::info!("Feature service started");
//! ```
//!
//! # Environment Variables
//!
//! - `LAUNCHPARTY_DEBUG=1` - Enable debug logging
//! - `LAUNCHPARTY_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `LAUNCHPARTY_LOG_FORMAT=pretty|json|compact` - Set output format (default: json)
//! - `LAUNCHPARTY_LOG_COLOR=1|0` - Enable/disable colors
//! - `RUST_LOG` - Full `EnvFilter` directives, overrides the level

use std::env;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

// ============================================================================
// Log Levels
// ============================================================================

/// Minimum level of emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl Level {
    /// Get level from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    /// Directive understood by `EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-line human readable output
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl Format {
    /// Get format from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether colors are enabled
    pub color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: Format::Json,
            color: false, // JSON output doesn't use colors
        }
    }
}

fn flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let debug = lookup("LAUNCHPARTY_DEBUG").is_some_and(|v| flag(&v));

        let level = lookup("LAUNCHPARTY_LOG_LEVEL")
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = lookup("LAUNCHPARTY_LOG_FORMAT")
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Json);

        let color = lookup("LAUNCHPARTY_LOG_COLOR")
            .map(|v| flag(&v))
            .unwrap_or_else(|| lookup("NO_COLOR").is_none() && lookup("TERM").is_some());

        Self {
            level,
            format,
            color,
        }
    }
}

// ============================================================================
// Subscriber
// ============================================================================

/// Build a subscriber for `config`. `RUST_LOG` takes precedence over the level.
pub fn subscriber(config: LogConfig) -> impl tracing::Subscriber + Send + Sync {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()));

    let output: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        Format::Json => fmt::layer().json().flatten_event(true).boxed(),
        Format::Compact => fmt::layer().compact().with_ansi(config.color).boxed(),
        Format::Pretty => fmt::layer().pretty().with_ansi(config.color).boxed(),
    };

    tracing_subscriber::registry().with(output).with(filter)
}

/// Install the global subscriber configured from the environment.
pub fn try_init() -> Result<(), TryInitError> {
    subscriber(LogConfig::from_env()).try_init()
}

/// Like [`try_init`], but a subscriber that is already installed is kept.
pub fn init() {
    let _ = try_init();
}
