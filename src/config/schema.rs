//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files, and every
//! field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct DumpConfig {
    /// Reload `[render]` when the config file changes.
    pub watch: bool,

    /// Body rendering settings.
    pub render: RenderConfig,

    /// Relay used as the traffic source in tap mode.
    pub tap: TapConfig,

    /// Where rendered records are written.
    pub output: OutputConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Body rendering settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Pretty-print JSON and XML bodies; raw bodies otherwise.
    pub pretty: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Tap relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TapConfig {
    /// Address clients connect to (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Server the traffic is relayed to, as `host:port`.
    pub upstream_address: String,

    /// Maximum concurrently relayed connections (backpressure).
    pub max_connections: usize,

    /// Bytes buffered per direction between the relay and its consumer.
    pub tee_buffer_bytes: usize,

    /// How long to wait for open connections after shutdown is requested.
    pub drain_timeout_secs: u64,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            upstream_address: "127.0.0.1:80".to_string(),
            max_connections: 10_000,
            tee_buffer_bytes: 64 * 1024,
            drain_timeout_secs: 5,
        }
    }
}

/// Output destination.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// File to append records to; stdout when empty.
    pub path: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
