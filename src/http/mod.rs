//! HTTP message model.
//!
//! # Data Flow
//! ```text
//! first line (request-line / status-line)
//!     → sequence.rs (allocate MessageId)
//!     → message.rs (HttpMessage: direction, endpoints, head line)
//! header lines
//!     → message.rs (ordered headers, chunked / websocket flags)
//!     → format.rs (Content-Type → BodyFormat)
//! body lines
//!     → message.rs (body joined with CRLF)
//! ```

pub mod format;
pub mod message;
pub mod sequence;

pub use format::BodyFormat;
pub use message::{Direction, Endpoints, Headers, HttpMessage, LINE_BREAK};
pub use sequence::{MessageId, SequenceAllocator};
