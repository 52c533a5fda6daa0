//! Flow consumption subsystem.
//!
//! # Data Flow
//! ```text
//! one direction of a TCP connection (ordered bytes)
//!     → dispatch.rs (one task per flow)
//!     → lines.rs (read next line, delimiter stripped)
//!     → consumer.rs (Start → Headers → Body → Done)
//!     → render::MessagePresenter (buffered message, or live head + frames)
//! ```
//!
//! # Design Decisions
//! - Consumers share nothing but the id allocator and the output sink
//! - Reading the next line is the only suspension point
//! - Stream end, not message framing, delimits a message

pub mod consumer;
pub mod dispatch;
pub mod lines;
pub mod replay;

pub use consumer::{FlowStreamConsumer, OutputMode, ParseState, Progress};
pub use dispatch::FlowDispatcher;
pub use lines::LineReader;
pub use replay::replay_file;
