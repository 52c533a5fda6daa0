//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: DumpConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::DumpConfig;

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("tap.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("tap.upstream_address `{0}` must be host:port")]
    UpstreamAddress(String),

    #[error("tap.max_connections must be greater than zero")]
    MaxConnections,

    #[error("tap.tee_buffer_bytes must be greater than zero")]
    TeeBuffer,

    #[error("observability.log_level `{0}` is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &DumpConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let tap = &config.tap;
    if tap.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(tap.bind_address.clone()));
    }
    if !is_host_port(&tap.upstream_address) {
        errors.push(ValidationError::UpstreamAddress(tap.upstream_address.clone()));
    }
    if tap.max_connections == 0 {
        errors.push(ValidationError::MaxConnections);
    }
    if tap.tee_buffer_bytes == 0 {
        errors.push(ValidationError::TeeBuffer);
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(observability.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_host_port(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}
