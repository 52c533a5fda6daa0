//! Network layer: the tap relay.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (id, drain tracking)
//!     → tap.rs (connect upstream, relay both directions, tee into flows)
//!     → stream::FlowDispatcher (one consumer per direction)
//! ```
//!
//! # Design Decisions
//! - The kernel TCP stack delivers each direction ordered and deduplicated,
//!   so no segment reassembly is needed
//! - Bounded accept prevents unbounded consumer tasks

pub mod connection;
pub mod listener;
pub mod tap;

pub use listener::{Listener, ListenerError};
pub use tap::{Tap, TapError};
