//! Metrics collection and exposition.
//!
//! # Metrics
//! - `httpdump_messages_total` (counter): emitted messages by direction
//! - `httpdump_flows_discarded_total` (counter): flows whose first line was not HTTP
//! - `httpdump_websocket_frames_total` (counter): live frame records
//! - `httpdump_pretty_print_failures_total` (counter): bodies emitted raw after a
//!   formatting failure, by format
//! - `httpdump_tap_connections_active` (gauge): connections currently relayed

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::http::{BodyFormat, Direction};

pub const MESSAGES_TOTAL: &str = "httpdump_messages_total";
pub const FLOWS_DISCARDED: &str = "httpdump_flows_discarded_total";
pub const WEBSOCKET_FRAMES: &str = "httpdump_websocket_frames_total";
pub const PRETTY_PRINT_FAILURES: &str = "httpdump_pretty_print_failures_total";
pub const TAP_CONNECTIONS_ACTIVE: &str = "httpdump_tap_connections_active";

/// Install the Prometheus recorder and its HTTP scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_message(direction: Direction) {
    counter!(MESSAGES_TOTAL, "direction" => direction.as_str()).increment(1);
}

pub fn record_flow_discarded() {
    counter!(FLOWS_DISCARDED).increment(1);
}

pub fn record_websocket_frame() {
    counter!(WEBSOCKET_FRAMES).increment(1);
}

pub fn record_pretty_failure(format: BodyFormat) {
    counter!(PRETTY_PRINT_FAILURES, "format" => format.as_str()).increment(1);
}

pub fn inc_tap_connections() {
    gauge!(TAP_CONNECTIONS_ACTIVE).increment(1.0);
}

pub fn dec_tap_connections() {
    gauge!(TAP_CONNECTIONS_ACTIVE).decrement(1.0);
}
