//! Message rendering.
//!
//! # Data Flow
//! ```text
//! HttpMessage
//!     → presenter.rs (head block: banner, endpoints, head line, headers)
//!     → json.rs / xml.rs (body block, by BodyFormat)
//!     → OutputSink
//! ```
//!
//! # Design Decisions
//! - Pretty-print failures never drop a message; the raw body is emitted
//! - Render settings are read per message so a reload applies to the next one

pub mod json;
pub mod presenter;
pub mod xml;

use thiserror::Error;

pub use json::prettify_json;
pub use presenter::MessagePresenter;
pub use xml::prettify_xml;

/// Indentation width used by both pretty-printers.
pub const INDENT_WIDTH: usize = 4;

/// Failure to pretty-print a body.
#[derive(Debug, Error)]
pub enum PrettyError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML body: {0}")]
    Xml(String),

    #[error("formatted body is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
