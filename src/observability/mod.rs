//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured diagnostic events on stderr)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Operator terminal / log aggregation
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Rendered HTTP records go to the OutputSink, never through tracing
//! - Metric updates are cheap when no recorder is installed

pub mod logging;
pub mod metrics;
