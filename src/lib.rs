//! Passive HTTP/1.x message inspection.
//!
//! Reconstructs HTTP requests and responses from the byte streams of TCP
//! connections and renders them as human-readable records, with JSON/XML bodies
//! pretty-printed and WebSocket frames logged live after an upgrade.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod output;
pub mod render;
pub mod stream;

pub use config::DumpConfig;
pub use http::{HttpMessage, SequenceAllocator};
pub use net::Tap;
pub use output::{MemorySink, OutputSink, WriterSink};
pub use render::MessagePresenter;
pub use stream::{FlowDispatcher, FlowStreamConsumer};
